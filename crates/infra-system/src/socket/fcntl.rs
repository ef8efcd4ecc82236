// Two-step socket creation for targets without SOCK_CLOEXEC (Apple)
//
// There is a window between socket() and F_SETFD where the descriptor is not
// close-on-exec. Callers must not fork+exec concurrently with create().

use nix::fcntl::{fcntl, FcntlArg, FdFlag, OFlag};
use nix::sys::socket::SockFlag;
use std::io;
use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd, RawFd};
use tracing::{debug, warn};

use hostkit_core::domain::{BlockOption, SocketRequest};
use hostkit_core::port::{SocketError, SocketFactory};

use super::{create_error, release_descriptor, SocketArgs};

/// Creates a plain socket, then sets FD_CLOEXEC (and O_NONBLOCK) with fcntl()
#[derive(Debug, Clone, Copy, Default)]
pub struct FcntlSocketFactory;

impl FcntlSocketFactory {
    /// Create the socket, then run `configure` on it in place of the fcntl() step
    ///
    /// If `configure` fails the descriptor is closed before its error is
    /// returned; a failed close turns into `SocketError::Fatal`.
    pub fn create_with<F>(
        &self,
        request: &SocketRequest,
        configure: F,
    ) -> Result<OwnedFd, SocketError>
    where
        F: FnOnce(RawFd, BlockOption) -> Result<(), SocketError>,
    {
        let fd = SocketArgs::new(request)
            .and_then(|args| args.open(SockFlag::empty()))
            .map_err(|errno| create_error(request, errno))?;

        if let Err(err) = configure(fd.as_raw_fd(), request.block_option) {
            release_descriptor(fd.into_raw_fd())?;
            return Err(err);
        }

        debug!(request = %request, "Socket created, flags applied with fcntl");
        Ok(fd)
    }
}

impl SocketFactory for FcntlSocketFactory {
    fn create(&self, request: &SocketRequest) -> Result<OwnedFd, SocketError> {
        self.create_with(request, apply_flags)
    }

    fn name(&self) -> &'static str {
        "fcntl"
    }
}

/// OR FD_CLOEXEC into the descriptor flags, and O_NONBLOCK into the status flags
fn apply_flags(fd: RawFd, block_option: BlockOption) -> Result<(), SocketError> {
    let current = fcntl(fd, FcntlArg::F_GETFD).map_err(|e| configure_error("F_GETFD", e))?;
    let fd_flags = FdFlag::from_bits_truncate(current) | FdFlag::FD_CLOEXEC;
    fcntl(fd, FcntlArg::F_SETFD(fd_flags)).map_err(|e| configure_error("F_SETFD", e))?;

    if block_option.is_non_blocking() {
        let current = fcntl(fd, FcntlArg::F_GETFL).map_err(|e| configure_error("F_GETFL", e))?;
        let status_flags = OFlag::from_bits_truncate(current) | OFlag::O_NONBLOCK;
        fcntl(fd, FcntlArg::F_SETFL(status_flags)).map_err(|e| configure_error("F_SETFL", e))?;
    }

    Ok(())
}

fn configure_error(op: &'static str, errno: nix::errno::Errno) -> SocketError {
    warn!(op = op, error = %errno, "fcntl() failed on new socket");
    SocketError::Configure {
        op,
        source: io::Error::from(errno),
    }
}
