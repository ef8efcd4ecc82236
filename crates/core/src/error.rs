// Central configuration error type

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Buffer bound for {key} must be at least {min}, got {value}")]
    BoundTooSmall {
        key: &'static str,
        value: usize,
        min: usize,
    },
}

/// Result type alias using ConfigError
pub type Result<T> = std::result::Result<T, ConfigError>;
