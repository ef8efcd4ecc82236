// Domain Layer - Pure request and result values

pub mod command;
pub mod error;
pub mod socket;

// Re-exports
pub use command::{strip_trailing_newline, CommandLine};
pub use error::DomainError;
pub use socket::{
    BlockOption, DescriptorFlags, SocketDomain, SocketKind, SocketProtocol, SocketRequest,
};
