// Port Layer - Interfaces for OS-facing adapters

pub mod command_executor;
pub mod log_sink;
pub mod socket_factory;

// Re-exports
pub use command_executor::{
    CommandError, CommandExecutor, CommandOutcome, ExecutorConfig, TruncationPolicy,
};
pub use log_sink::LogSink;
pub use socket_factory::{SocketError, SocketFactory};
