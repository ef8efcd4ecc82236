// Platform utility constants (no magic values)

/// Max length of a composed system command, terminator included (1023 bytes of text)
pub const SYSTEM_COMMAND_MAX_LENGTH: usize = 1024;

/// Buffer size for one read of command output, terminator included
pub const OUTPUT_BUFFER_SIZE: usize = 1024;

/// Shell used to interpret composed command lines
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Smallest accepted buffer bound (one byte of text plus terminator)
pub const MIN_BUFFER_SIZE: usize = 2;

/// Environment variable names read by `ExecutorConfig::from_env`
pub const ENV_SHELL: &str = "HOSTKIT_SHELL";
pub const ENV_MAX_COMMAND_LEN: &str = "HOSTKIT_MAX_COMMAND_LEN";
pub const ENV_OUTPUT_BUFFER_SIZE: &str = "HOSTKIT_OUTPUT_BUFFER_SIZE";
pub const ENV_STRICT_COMMANDS: &str = "HOSTKIT_STRICT_COMMANDS";
