// Hostkit Infrastructure - OS Adapters
// Implements: SocketFactory, CommandExecutor, LogSink

pub mod line_chunker;
pub mod shell_executor;
pub mod socket;
pub mod tracing_log_sink;

pub use line_chunker::LineChunker;
pub use shell_executor::ShellCommandExecutor;
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
pub use socket::AtomicSocketFactory;
pub use socket::{
    default_socket_factory, inspect_descriptor, release_descriptor, socket_with_close_exec,
    FcntlSocketFactory, PlatformSocketFactory,
};
pub use tracing_log_sink::TracingLogSink;
