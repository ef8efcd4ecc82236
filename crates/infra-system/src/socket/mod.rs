// Socket factory adapters
// reason: nix for typed socket()/fcntl()/close() wrappers

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
mod atomic;
mod fcntl;

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
pub use atomic::AtomicSocketFactory;
pub use fcntl::FcntlSocketFactory;

use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, FdFlag, OFlag};
use nix::sys::socket::{socket, AddressFamily, SockFlag, SockProtocol, SockType};
use std::io;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use tracing::{error, warn};

use hostkit_core::domain::{
    BlockOption, DescriptorFlags, SocketDomain, SocketKind, SocketProtocol, SocketRequest,
};
use hostkit_core::port::{SocketError, SocketFactory};

/// Creation strategy compiled in for this target
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
pub type PlatformSocketFactory = AtomicSocketFactory;

/// Creation strategy compiled in for this target
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
pub type PlatformSocketFactory = FcntlSocketFactory;

pub fn default_socket_factory() -> PlatformSocketFactory {
    PlatformSocketFactory::default()
}

/// Create a close-on-exec socket with the platform's default strategy
pub fn socket_with_close_exec(
    domain: SocketDomain,
    kind: SocketKind,
    protocol: SocketProtocol,
    block_option: BlockOption,
) -> Result<OwnedFd, SocketError> {
    let request = SocketRequest::new(domain, kind, protocol).with_block_option(block_option);
    default_socket_factory().create(&request)
}

/// Close a descriptor during setup cleanup
///
/// A failed close means the descriptor table is in an unknown state, so the
/// error is `SocketError::Fatal` and must end the process.
pub fn release_descriptor(fd: RawFd) -> Result<(), SocketError> {
    nix::unistd::close(fd).map_err(|errno| {
        error!(fd = fd, error = %errno, "close() failed during socket cleanup");
        SocketError::Fatal {
            fd,
            source: io::Error::from(errno),
        }
    })
}

/// Read back close-on-exec and non-blocking state of `fd`
pub fn inspect_descriptor<Fd: AsRawFd>(fd: &Fd) -> io::Result<DescriptorFlags> {
    let raw = fd.as_raw_fd();
    let fd_flags = FdFlag::from_bits_truncate(fcntl(raw, FcntlArg::F_GETFD)?);
    let status_flags = OFlag::from_bits_truncate(fcntl(raw, FcntlArg::F_GETFL)?);

    Ok(DescriptorFlags {
        close_on_exec: fd_flags.contains(FdFlag::FD_CLOEXEC),
        non_blocking: status_flags.contains(OFlag::O_NONBLOCK),
    })
}

/// (family, type, protocol) as nix values, ready for socket()
///
/// A family or protocol this target cannot express fails the same way the
/// kernel would reject it, before any descriptor exists.
struct SocketArgs {
    family: AddressFamily,
    kind: SockType,
    protocol: Option<SockProtocol>,
}

impl SocketArgs {
    fn new(request: &SocketRequest) -> Result<Self, Errno> {
        Ok(Self {
            family: address_family(request.domain)?,
            kind: sock_type(request.kind),
            protocol: sock_protocol(request.protocol)?,
        })
    }

    fn open(self, flags: SockFlag) -> nix::Result<OwnedFd> {
        socket(self.family, self.kind, flags, self.protocol)
    }
}

fn address_family(domain: SocketDomain) -> Result<AddressFamily, Errno> {
    let family = match domain {
        SocketDomain::Inet => Some(AddressFamily::Inet),
        SocketDomain::Inet6 => Some(AddressFamily::Inet6),
        SocketDomain::Unix => Some(AddressFamily::Unix),
        #[cfg(any(target_os = "linux", target_os = "android"))]
        SocketDomain::Netlink => Some(AddressFamily::Netlink),
        #[cfg(any(target_os = "linux", target_os = "android"))]
        SocketDomain::Packet => Some(AddressFamily::Packet),
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        SocketDomain::Netlink | SocketDomain::Packet => None,
        SocketDomain::Other(raw) => AddressFamily::from_i32(raw),
    };
    family.ok_or(Errno::EAFNOSUPPORT)
}

fn sock_type(kind: SocketKind) -> SockType {
    match kind {
        SocketKind::Stream => SockType::Stream,
        SocketKind::Datagram => SockType::Datagram,
        SocketKind::SeqPacket => SockType::SeqPacket,
        SocketKind::Raw => SockType::Raw,
    }
}

fn sock_protocol(protocol: SocketProtocol) -> Result<Option<SockProtocol>, Errno> {
    let protocol = match protocol {
        SocketProtocol::Default => return Ok(None),
        SocketProtocol::Tcp => SockProtocol::Tcp,
        SocketProtocol::Udp => SockProtocol::Udp,
        SocketProtocol::Icmp => SockProtocol::Icmp,
        SocketProtocol::IcmpV6 => SockProtocol::IcmpV6,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        SocketProtocol::NetlinkRoute => SockProtocol::NetlinkRoute,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        SocketProtocol::NetlinkUevent => SockProtocol::NetlinkKObjectUEvent,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        SocketProtocol::EthAll => SockProtocol::EthAll,
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        SocketProtocol::NetlinkRoute | SocketProtocol::NetlinkUevent | SocketProtocol::EthAll => {
            return Err(Errno::EPROTONOSUPPORT)
        }
    };
    Ok(Some(protocol))
}

fn create_error(request: &SocketRequest, errno: Errno) -> SocketError {
    warn!(request = %request, error = %errno, "socket() failed");
    SocketError::Create {
        request: *request,
        source: io::Error::from(errno),
    }
}
