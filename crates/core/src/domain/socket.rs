// Socket request model
// Values only: the adapters map them onto OS constants

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::DomainError;

/// Address family passed through to socket creation
///
/// `Other` carries a raw `AF_*` number for families without a name here.
/// Families the target does not support fail at creation, not at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketDomain {
    Inet,
    Inet6,
    Unix,
    Netlink,
    Packet,
    Other(i32),
}

/// Socket type passed through to socket creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketKind {
    Stream,
    Datagram,
    SeqPacket,
    Raw,
}

/// Protocol passed through to socket creation
///
/// `Default` lets the OS pick the protocol for the (domain, kind) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SocketProtocol {
    #[default]
    Default,
    Tcp,
    Udp,
    Icmp,
    #[serde(rename = "icmpv6")]
    IcmpV6,
    NetlinkRoute,
    NetlinkUevent,
    EthAll,
}

/// Blocking mode requested for a new socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockOption {
    #[default]
    Block,
    NonBlock,
}

impl BlockOption {
    pub fn is_non_blocking(self) -> bool {
        matches!(self, BlockOption::NonBlock)
    }
}

/// One socket creation request: (domain, kind, protocol, blocking mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketRequest {
    pub domain: SocketDomain,
    pub kind: SocketKind,
    pub protocol: SocketProtocol,
    pub block_option: BlockOption,
}

impl SocketRequest {
    /// Blocking request; use `non_blocking()` to flip the mode
    pub fn new(domain: SocketDomain, kind: SocketKind, protocol: SocketProtocol) -> Self {
        Self {
            domain,
            kind,
            protocol,
            block_option: BlockOption::Block,
        }
    }

    pub fn non_blocking(self) -> Self {
        self.with_block_option(BlockOption::NonBlock)
    }

    pub fn with_block_option(mut self, block_option: BlockOption) -> Self {
        self.block_option = block_option;
        self
    }
}

impl std::fmt::Display for SocketRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{} ({})",
            self.domain, self.kind, self.protocol, self.block_option
        )
    }
}

/// Descriptor state relevant to socket setup, read back from the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorFlags {
    pub close_on_exec: bool,
    pub non_blocking: bool,
}

impl DescriptorFlags {
    /// True when the flags honour a request made with `block_option`
    pub fn satisfies(&self, block_option: BlockOption) -> bool {
        self.close_on_exec && self.non_blocking == block_option.is_non_blocking()
    }
}

macro_rules! string_enum {
    (
        $ty:ident, $kind:literal,
        { $($variant:ident => $name:literal),+ $(,)? }
        $(, numeric $other:ident)?
    ) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($ty::$variant => f.write_str($name),)+
                    $($ty::$other(n) => write!(f, "{n}"),)?
                }
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => return Ok($ty::$variant),)+
                    _ => {}
                }
                $(if let Ok(n) = s.parse::<i32>() {
                    return Ok($ty::$other(n));
                })?
                Err(DomainError::UnknownVariant {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }
    };
}

string_enum!(SocketDomain, "socket domain", {
    Inet => "inet",
    Inet6 => "inet6",
    Unix => "unix",
    Netlink => "netlink",
    Packet => "packet",
}, numeric Other);

string_enum!(SocketKind, "socket type", {
    Stream => "stream",
    Datagram => "datagram",
    SeqPacket => "seqpacket",
    Raw => "raw",
});

string_enum!(SocketProtocol, "socket protocol", {
    Default => "default",
    Tcp => "tcp",
    Udp => "udp",
    Icmp => "icmp",
    IcmpV6 => "icmpv6",
    NetlinkRoute => "netlink-route",
    NetlinkUevent => "netlink-uevent",
    EthAll => "eth-all",
});

string_enum!(BlockOption, "block option", {
    Block => "block",
    NonBlock => "nonblock",
});
