// Command Executor Port
// Runs a composed command line through the shell and logs what it prints

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::constants::{
    DEFAULT_SHELL, ENV_MAX_COMMAND_LEN, ENV_OUTPUT_BUFFER_SIZE, ENV_SHELL, ENV_STRICT_COMMANDS,
    MIN_BUFFER_SIZE, OUTPUT_BUFFER_SIZE, SYSTEM_COMMAND_MAX_LENGTH,
};
use crate::domain::{CommandLine, DomainError};
use crate::error::ConfigError;

/// Result of a successful execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub exit_code: Option<i32>,
    /// Raw wait status, as a shell `pclose` would report it
    pub raw_status: i32,
    /// Number of output lines forwarded to the log sink
    pub lines: usize,
}

/// Execution errors
///
/// Every variant is the same failure to a caller that only checks pass/fail;
/// the variant and the log carry the detail.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid command: {0}")]
    Invalid(#[from] DomainError),

    #[error("Spawn failed: {0}")]
    SpawnFailed(#[source] io::Error),

    #[error("Reading command output failed: {0}")]
    ReadFailed(#[source] io::Error),

    #[error("Waiting for command failed: {0}")]
    WaitFailed(#[source] io::Error),

    #[error("Command exited with status {raw_status} (code {code:?})")]
    NonZeroExit { code: Option<i32>, raw_status: i32 },
}

impl CommandError {
    /// OS error behind the failure, when there is one
    pub fn os_error(&self) -> Option<&io::Error> {
        match self {
            CommandError::SpawnFailed(e)
            | CommandError::ReadFailed(e)
            | CommandError::WaitFailed(e) => Some(e),
            CommandError::Invalid(_) | CommandError::NonZeroExit { .. } => None,
        }
    }
}

/// What to do with a command line that does not fit the bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncationPolicy {
    /// Cut the text at the bound and run what remains
    #[default]
    Silent,
    /// Refuse with `DomainError::CommandTooLong`
    Reject,
}

/// Executor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Shell invoked as `<shell> -c <command line>`
    pub shell: PathBuf,

    /// Command line bound, terminator included
    pub max_command_len: usize,

    /// Output read bound, terminator included
    pub output_buffer_size: usize,

    pub truncation: TruncationPolicy,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            shell: PathBuf::from(DEFAULT_SHELL),
            max_command_len: SYSTEM_COMMAND_MAX_LENGTH,
            output_buffer_size: OUTPUT_BUFFER_SIZE,
            truncation: TruncationPolicy::Silent,
        }
    }
}

impl ExecutorConfig {
    /// Defaults overridden by `HOSTKIT_*` environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(shell) = lookup(ENV_SHELL).filter(|s| !s.is_empty()) {
            config.shell = PathBuf::from(shell);
        }
        if let Some(value) = lookup(ENV_MAX_COMMAND_LEN) {
            config.max_command_len = parse_bound(ENV_MAX_COMMAND_LEN, &value)?;
        }
        if let Some(value) = lookup(ENV_OUTPUT_BUFFER_SIZE) {
            config.output_buffer_size = parse_bound(ENV_OUTPUT_BUFFER_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_STRICT_COMMANDS) {
            config.truncation = if parse_flag(ENV_STRICT_COMMANDS, &value)? {
                TruncationPolicy::Reject
            } else {
                TruncationPolicy::Silent
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        for (key, value) in [
            (ENV_MAX_COMMAND_LEN, self.max_command_len),
            (ENV_OUTPUT_BUFFER_SIZE, self.output_buffer_size),
        ] {
            if value < MIN_BUFFER_SIZE {
                return Err(ConfigError::BoundTooSmall {
                    key,
                    value,
                    min: MIN_BUFFER_SIZE,
                });
            }
        }
        Ok(())
    }

    /// Compose a command line under this config's bound and policy
    pub fn compose(&self, args: fmt::Arguments<'_>) -> Result<CommandLine, DomainError> {
        match self.truncation {
            TruncationPolicy::Silent => Ok(CommandLine::format_bounded(args, self.max_command_len)),
            TruncationPolicy::Reject => {
                CommandLine::format_strict_bounded(args, self.max_command_len)
            }
        }
    }
}

fn parse_bound(key: &'static str, value: &str) -> crate::Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_flag(key: &'static str, value: &str) -> crate::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

/// Command executor trait
///
/// Implementations:
/// - ShellCommandExecutor: `<shell> -c`, stdout piped into the log sink
pub trait CommandExecutor: Send + Sync {
    fn config(&self) -> &ExecutorConfig;

    /// Run `command` to completion, blocking the caller
    ///
    /// # Errors
    /// - CommandError::SpawnFailed if the shell cannot be started
    /// - CommandError::ReadFailed if reading its output fails
    /// - CommandError::NonZeroExit if it exits non-zero or by signal
    fn execute(&self, command: &CommandLine) -> Result<CommandOutcome, CommandError>;

    /// Compose under `config()` and run
    fn execute_fmt(&self, args: fmt::Arguments<'_>) -> Result<CommandOutcome, CommandError> {
        let command = self.config().compose(args)?;
        self.execute(&command)
    }
}

/// Compose and run a command with `format!` syntax
///
/// ```text
/// execute_command!(executor, "ip -6 route add {} dev {}", prefix, ifname)?;
/// ```
#[macro_export]
macro_rules! execute_command {
    ($executor:expr, $($arg:tt)*) => {{
        use $crate::port::CommandExecutor as _;
        ($executor).execute_fmt(::std::format_args!($($arg)*))
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ExecutorConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ExecutorConfig::default());
        assert_eq!(config.shell, PathBuf::from("/bin/sh"));
        assert_eq!(config.max_command_len, 1024);
        assert_eq!(config.output_buffer_size, 1024);
    }

    #[test]
    fn test_env_overrides() {
        let config = ExecutorConfig::from_lookup(lookup_from(&[
            ("HOSTKIT_SHELL", "/bin/bash"),
            ("HOSTKIT_MAX_COMMAND_LEN", "64"),
            ("HOSTKIT_OUTPUT_BUFFER_SIZE", " 16 "),
            ("HOSTKIT_STRICT_COMMANDS", "yes"),
        ]))
        .unwrap();

        assert_eq!(config.shell, PathBuf::from("/bin/bash"));
        assert_eq!(config.max_command_len, 64);
        assert_eq!(config.output_buffer_size, 16);
        assert_eq!(config.truncation, TruncationPolicy::Reject);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let err = ExecutorConfig::from_lookup(lookup_from(&[("HOSTKIT_MAX_COMMAND_LEN", "lots")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "HOSTKIT_MAX_COMMAND_LEN",
                ..
            }
        ));
    }

    #[test]
    fn test_bound_too_small_rejected() {
        let err = ExecutorConfig::from_lookup(lookup_from(&[("HOSTKIT_OUTPUT_BUFFER_SIZE", "1")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::BoundTooSmall {
                key: "HOSTKIT_OUTPUT_BUFFER_SIZE",
                value: 1,
                min: 2,
            }
        );
    }

    #[test]
    fn test_invalid_flag_rejected() {
        let err = ExecutorConfig::from_lookup(lookup_from(&[("HOSTKIT_STRICT_COMMANDS", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_compose_follows_policy() {
        let mut config = ExecutorConfig {
            max_command_len: 8,
            ..ExecutorConfig::default()
        };

        let cmd = config.compose(format_args!("echo {}", "hello")).unwrap();
        assert_eq!(cmd.as_str(), "echo he");
        assert!(cmd.is_truncated());

        config.truncation = TruncationPolicy::Reject;
        let err = config.compose(format_args!("echo {}", "hello")).unwrap_err();
        assert_eq!(err, DomainError::CommandTooLong { len: 10, max: 7 });
    }

    #[test]
    fn test_config_serializes() {
        let json = serde_json::to_value(ExecutorConfig::default()).unwrap();
        assert_eq!(json["shell"], "/bin/sh");
        assert_eq!(json["truncation"], "silent");
    }

    #[test]
    fn test_only_io_failures_carry_os_error() {
        let spawn = CommandError::SpawnFailed(io::Error::from_raw_os_error(2));
        assert_eq!(spawn.os_error().and_then(|e| e.raw_os_error()), Some(2));

        let exit = CommandError::NonZeroExit {
            code: Some(1),
            raw_status: 256,
        };
        assert!(exit.os_error().is_none());
    }
}
