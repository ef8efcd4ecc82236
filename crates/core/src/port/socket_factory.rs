// Socket Factory Port
// Creates sockets that are close-on-exec from the moment the caller sees them

use std::io;
use std::os::fd::{OwnedFd, RawFd};
use thiserror::Error;

use crate::domain::SocketRequest;
use crate::exit_code::ExitCode;

/// Socket setup errors
#[derive(Error, Debug)]
pub enum SocketError {
    /// socket() itself failed; no descriptor was allocated
    #[error("socket({request}) failed: {source}")]
    Create {
        request: SocketRequest,
        #[source]
        source: io::Error,
    },

    /// A flag syscall failed; the descriptor has already been closed
    #[error("fcntl({op}) failed: {source}")]
    Configure {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// Closing a descriptor during cleanup failed
    ///
    /// The descriptor table can no longer be trusted. The top-level runner
    /// terminates the process with `ExitCode::ErrorErrno` on this variant.
    #[error("close({fd}) failed during cleanup: {source}")]
    Fatal {
        fd: RawFd,
        #[source]
        source: io::Error,
    },
}

impl SocketError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, SocketError::Fatal { .. })
    }

    /// Exit classification a runner must terminate with, if any
    pub fn exit_code(&self) -> Option<ExitCode> {
        self.is_fatal().then_some(ExitCode::ErrorErrno)
    }

    pub fn os_error(&self) -> &io::Error {
        match self {
            SocketError::Create { source, .. }
            | SocketError::Configure { source, .. }
            | SocketError::Fatal { source, .. } => source,
        }
    }
}

/// Socket factory trait
///
/// Implementations:
/// - AtomicSocketFactory: flags folded into the socket() type argument
/// - FcntlSocketFactory: socket() followed by fcntl() flag updates
pub trait SocketFactory: Send + Sync {
    /// Create a socket with close-on-exec set, and non-blocking if requested
    ///
    /// # Errors
    /// - SocketError::Create if the OS refuses the (domain, type, protocol)
    /// - SocketError::Configure if a flag update fails (descriptor released)
    /// - SocketError::Fatal if releasing the descriptor fails
    fn create(&self, request: &SocketRequest) -> Result<OwnedFd, SocketError>;

    /// Short name of the creation strategy, for logs and reports
    fn name(&self) -> &'static str;
}
