// LogSink backed by tracing
// reason: the host installs one subscriber; command output joins its stream

use tracing::info;

use hostkit_core::port::LogSink;

/// Target every forwarded line is emitted under
pub const LOG_TARGET: &str = "hostkit::platform";

/// Forwards each line to `tracing::info!` under `hostkit::platform`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn info(&self, message: &str) {
        info!(target: LOG_TARGET, "{}", message);
    }
}
