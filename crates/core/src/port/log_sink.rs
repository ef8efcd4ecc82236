// Logging collaborator port
// Receives already formatted informational text, one call per line

/// Sink for command output and execution summaries
pub trait LogSink: Send + Sync {
    /// Record one informational line
    fn info(&self, message: &str);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Log sink that keeps every line in memory, in arrival order
    #[derive(Clone, Default)]
    pub struct RecordingLogSink {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingLogSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }

        pub fn clear(&self) {
            self.lines.lock().unwrap().clear();
        }
    }

    impl LogSink for RecordingLogSink {
        fn info(&self, message: &str) {
            self.lines.lock().unwrap().push(message.to_string());
        }
    }
}
