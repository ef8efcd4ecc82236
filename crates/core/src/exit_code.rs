// Process exit classification used by the top-level runner

use serde::Serialize;

/// Exit status classes a host process terminates with
///
/// `ErrorErrno` is reserved for unrecoverable OS failures, such as a
/// descriptor that cannot be closed during cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
    InvalidArguments = 2,
    ErrorErrno = 5,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitCode::Success => write!(f, "SUCCESS"),
            ExitCode::Failure => write!(f, "FAILURE"),
            ExitCode::InvalidArguments => write!(f, "INVALID_ARGUMENTS"),
            ExitCode::ErrorErrno => write!(f, "ERROR_ERRNO"),
        }
    }
}
