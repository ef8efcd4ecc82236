// Bounded shell command line
//
// NOTE: no escaping or sanitization is applied to the composed text. Any
// caller-supplied data formatted into a command line reaches the shell as-is.

use std::fmt::{self, Write};

use super::error::DomainError;
use crate::constants::SYSTEM_COMMAND_MAX_LENGTH;

/// Shell command line composed from format arguments
///
/// The length bound counts a terminator byte, so a bound of 1024 holds at most
/// 1023 bytes of text. Text past the bound is cut at the previous UTF-8 char
/// boundary. An interior NUL ends the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    text: String,
    truncated: bool,
}

impl CommandLine {
    /// Bounded copy of an already composed command
    pub fn new(text: &str) -> Self {
        Self::format(format_args!("{}", text))
    }

    /// Compose with the default bound, truncating silently
    pub fn format(args: fmt::Arguments<'_>) -> Self {
        Self::format_bounded(args, SYSTEM_COMMAND_MAX_LENGTH)
    }

    /// Compose with an explicit bound (terminator included), truncating silently
    pub fn format_bounded(args: fmt::Arguments<'_>, max_len: usize) -> Self {
        let writer = BoundedWriter::compose(args, max_len);
        if writer.truncated {
            tracing::debug!(
                required = writer.required,
                capacity = writer.capacity,
                "Command line truncated"
            );
        }
        Self {
            truncated: writer.truncated,
            text: writer.buf,
        }
    }

    /// Compose with the default bound, rejecting text that does not fit
    pub fn format_strict(args: fmt::Arguments<'_>) -> Result<Self, DomainError> {
        Self::format_strict_bounded(args, SYSTEM_COMMAND_MAX_LENGTH)
    }

    pub fn format_strict_bounded(
        args: fmt::Arguments<'_>,
        max_len: usize,
    ) -> Result<Self, DomainError> {
        let writer = BoundedWriter::compose(args, max_len);
        if writer.truncated {
            return Err(DomainError::CommandTooLong {
                len: writer.required,
                max: writer.capacity,
            });
        }
        Ok(Self {
            truncated: false,
            text: writer.buf,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether text was dropped to fit the bound
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for CommandLine {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Compose a `CommandLine` with `format!` syntax and the default bound
///
/// ```
/// let cmd = hostkit_core::command_line!("ip -6 addr add {} dev {}", "fd00::1/64", "wpan0");
/// assert_eq!(cmd.as_str(), "ip -6 addr add fd00::1/64 dev wpan0");
/// ```
#[macro_export]
macro_rules! command_line {
    ($($arg:tt)*) => {
        $crate::domain::CommandLine::format(::std::format_args!($($arg)*))
    };
}

/// Drop one trailing `\n`, if present
///
/// An empty chunk has nothing to strip.
pub fn strip_trailing_newline(chunk: &[u8]) -> &[u8] {
    match chunk.split_last() {
        Some((b'\n', rest)) => rest,
        _ => chunk,
    }
}

/// `fmt::Write` sink that keeps at most `capacity` bytes
struct BoundedWriter {
    buf: String,
    capacity: usize,
    // Bytes the untruncated text would need, up to the first NUL
    required: usize,
    terminated: bool,
    truncated: bool,
}

impl BoundedWriter {
    fn compose(args: fmt::Arguments<'_>, max_len: usize) -> Self {
        let capacity = max_len.saturating_sub(1);
        let mut writer = Self {
            buf: String::with_capacity(capacity.min(SYSTEM_COMMAND_MAX_LENGTH)),
            capacity,
            required: 0,
            terminated: false,
            truncated: false,
        };
        // write_str never fails, so neither does composition
        let _ = writer.write_fmt(args);
        writer
    }
}

impl Write for BoundedWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.terminated {
            return Ok(());
        }

        let s = match s.find('\0') {
            Some(nul) => {
                self.terminated = true;
                &s[..nul]
            }
            None => s,
        };
        self.required += s.len();
        if self.truncated {
            // Nothing more fits; keep counting for the strict report
            return Ok(());
        }

        let room = self.capacity - self.buf.len();
        if s.len() <= room {
            self.buf.push_str(s);
            return Ok(());
        }

        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.buf.push_str(&s[..cut]);
        self.truncated = true;
        Ok(())
    }
}
