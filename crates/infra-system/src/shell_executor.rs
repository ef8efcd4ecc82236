// Shell command executor
// Blocking by contract: spawn -> drain stdout -> reap, no timeout

use std::io::{self, BufReader};
use std::os::unix::process::ExitStatusExt;
use std::process::{ChildStdout, Command, Stdio};
use std::sync::Arc;
use tracing::{debug, warn};

use hostkit_core::domain::{strip_trailing_newline, CommandLine};
use hostkit_core::port::{
    CommandError, CommandExecutor, CommandOutcome, ExecutorConfig, LogSink,
};

use crate::line_chunker::LineChunker;
use crate::tracing_log_sink::TracingLogSink;

/// Runs command lines as `<shell> -c <command>` and logs their stdout
///
/// stdin and stderr are inherited from the host; only stdout is captured.
pub struct ShellCommandExecutor {
    config: ExecutorConfig,
    log_sink: Arc<dyn LogSink>,
}

impl ShellCommandExecutor {
    /// Create a new shell executor
    ///
    /// # Arguments
    /// * `config` - Shell path and buffer bounds
    /// * `log_sink` - Receives every output line and the execution summary
    ///
    /// # Example
    /// ```ignore
    /// let executor = ShellCommandExecutor::new(
    ///     ExecutorConfig::default(),
    ///     Arc::new(TracingLogSink),
    /// );
    /// execute_command!(executor, "ip link set {} up", ifname)?;
    /// ```
    pub fn new(config: ExecutorConfig, log_sink: Arc<dyn LogSink>) -> Self {
        Self { config, log_sink }
    }

    /// Executor logging through `tracing`
    pub fn with_tracing(config: ExecutorConfig) -> Self {
        Self::new(config, Arc::new(TracingLogSink))
    }

    /// Spawn, forward output, reap
    fn run(&self, command: &CommandLine) -> Result<CommandOutcome, CommandError> {
        debug!(
            command = %command,
            shell = %self.config.shell.display(),
            truncated = command.is_truncated(),
            "Spawning shell command"
        );

        let mut child = Command::new(&self.config.shell)
            .arg("-c")
            .arg(command.as_str())
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(CommandError::SpawnFailed)?;

        // Dropped inside forward_output, so the pipe is closed before wait()
        let forwarded = match child.stdout.take() {
            Some(stdout) => self.forward_output(stdout),
            None => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "child stdout was not captured",
            )),
        };

        let status = child.wait().map_err(CommandError::WaitFailed)?;
        let raw_status = status.into_raw();
        self.log_sink
            .info(&format!("Execute command `{}` = {}", command, raw_status));

        let lines = forwarded.map_err(CommandError::ReadFailed)?;

        if !status.success() {
            return Err(CommandError::NonZeroExit {
                code: status.code(),
                raw_status,
            });
        }

        Ok(CommandOutcome {
            exit_code: status.code(),
            raw_status,
            lines,
        })
    }

    /// Forward each bounded output line to the log sink, in order
    fn forward_output(&self, stdout: ChildStdout) -> io::Result<usize> {
        let mut chunker = LineChunker::new(BufReader::new(stdout), self.config.output_buffer_size);
        let mut lines = 0;

        while let Some(chunk) = chunker.next_chunk()? {
            let line = String::from_utf8_lossy(strip_trailing_newline(chunk));
            self.log_sink.info(&line);
            lines += 1;
        }

        Ok(lines)
    }
}

impl CommandExecutor for ShellCommandExecutor {
    fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    fn execute(&self, command: &CommandLine) -> Result<CommandOutcome, CommandError> {
        let result = self.run(command);

        if let Err(err) = &result {
            warn!(command = %command, error = %err, "Shell command failed");
            if let Some(os_error) = err.os_error() {
                self.log_sink.info(&format!(
                    "Got an error when executing command `{}`: `{}`",
                    command, os_error
                ));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostkit_core::command_line;
    use hostkit_core::execute_command;
    use hostkit_core::port::log_sink::mocks::RecordingLogSink;
    use hostkit_core::port::TruncationPolicy;
    use std::path::PathBuf;

    fn executor_with(config: ExecutorConfig) -> (ShellCommandExecutor, RecordingLogSink) {
        let sink = RecordingLogSink::new();
        let executor = ShellCommandExecutor::new(config, Arc::new(sink.clone()));
        (executor, sink)
    }

    fn executor() -> (ShellCommandExecutor, RecordingLogSink) {
        executor_with(ExecutorConfig::default())
    }

    #[test]
    fn test_execute_success_forwards_lines() {
        let (executor, sink) = executor();

        let outcome = executor
            .execute(&command_line!("printf 'alpha\\nbeta\\ngamma\\n'"))
            .unwrap();

        assert_eq!(outcome.exit_code, Some(0));
        assert_eq!(outcome.raw_status, 0);
        assert_eq!(outcome.lines, 3);
        assert_eq!(
            sink.lines(),
            vec![
                "alpha",
                "beta",
                "gamma",
                "Execute command `printf 'alpha\\nbeta\\ngamma\\n'` = 0",
            ]
        );
    }

    #[test]
    fn test_non_zero_exit_fails_with_raw_status() {
        let (executor, sink) = executor();

        let err = executor.execute(&command_line!("exit 3")).unwrap_err();

        match err {
            CommandError::NonZeroExit { code, raw_status } => {
                assert_eq!(code, Some(3));
                assert_eq!(raw_status, 3 << 8);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // No OS error, so no diagnostic line after the summary
        assert_eq!(sink.lines(), vec!["Execute command `exit 3` = 768"]);
    }

    #[test]
    fn test_missing_shell_fails_on_spawn() {
        let (executor, sink) = executor_with(ExecutorConfig {
            shell: PathBuf::from("/nonexistent/hostkit-sh"),
            ..ExecutorConfig::default()
        });

        let err = executor.execute(&command_line!("true")).unwrap_err();

        assert!(matches!(err, CommandError::SpawnFailed(_)));
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Got an error when executing command `true`: `"));
    }

    #[test]
    fn test_signal_exit_is_failure() {
        let (executor, _sink) = executor();

        let err = executor.execute(&command_line!("kill -TERM $$")).unwrap_err();

        match err {
            CommandError::NonZeroExit { code, raw_status } => {
                assert_eq!(code, None);
                assert_eq!(raw_status & 0x7f, 15);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_small_output_buffer_splits_lines() {
        let (executor, sink) = executor_with(ExecutorConfig {
            output_buffer_size: 4,
            ..ExecutorConfig::default()
        });

        let outcome = executor.execute(&command_line!("echo abcdefg")).unwrap();

        assert_eq!(outcome.lines, 3);
        assert_eq!(&sink.lines()[..3], &["abc", "def", "g"]);
    }

    #[test]
    fn test_execute_command_macro_honours_reject_policy() {
        let (executor, sink) = executor_with(ExecutorConfig {
            max_command_len: 8,
            truncation: TruncationPolicy::Reject,
            ..ExecutorConfig::default()
        });

        let err = execute_command!(executor, "echo {}", "too long").unwrap_err();

        assert!(matches!(err, CommandError::Invalid(_)));
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_execute_command_macro_truncates_silently() {
        let (executor, sink) = executor_with(ExecutorConfig {
            max_command_len: 9,
            ..ExecutorConfig::default()
        });

        // "echo hi; exit 1" is cut to "echo hi;" and succeeds
        let outcome = execute_command!(executor, "echo hi; {}", "exit 1").unwrap();

        assert_eq!(outcome.lines, 1);
        assert_eq!(sink.lines(), vec!["hi", "Execute command `echo hi;` = 0"]);
    }
}
