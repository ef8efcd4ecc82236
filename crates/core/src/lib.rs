// Hostkit Core - Domain Values & Ports
// NO infrastructure dependencies (hexagonal layout)

pub mod constants;
pub mod domain;
pub mod error;
pub mod exit_code;
pub mod port;

pub use error::{ConfigError, Result};
pub use exit_code::ExitCode;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
