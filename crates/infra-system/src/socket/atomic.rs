// Single-syscall socket creation (SOCK_CLOEXEC / SOCK_NONBLOCK)

use nix::sys::socket::SockFlag;
use std::os::fd::OwnedFd;
use tracing::debug;

use hostkit_core::domain::SocketRequest;
use hostkit_core::port::{SocketError, SocketFactory};

use super::{create_error, SocketArgs};

/// Folds close-on-exec and non-blocking into the socket() type argument
///
/// The descriptor never exists without FD_CLOEXEC, so a concurrent fork+exec
/// cannot inherit it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicSocketFactory;

impl SocketFactory for AtomicSocketFactory {
    fn create(&self, request: &SocketRequest) -> Result<OwnedFd, SocketError> {
        let mut flags = SockFlag::SOCK_CLOEXEC;
        if request.block_option.is_non_blocking() {
            flags |= SockFlag::SOCK_NONBLOCK;
        }

        let fd = SocketArgs::new(request)
            .and_then(|args| args.open(flags))
            .map_err(|errno| create_error(request, errno))?;

        debug!(request = %request, "Socket created with SOCK_CLOEXEC");
        Ok(fd)
    }

    fn name(&self) -> &'static str {
        "atomic"
    }
}
