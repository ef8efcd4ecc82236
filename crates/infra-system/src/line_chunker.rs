// Bounded line reader for command output

use std::io::{self, BufRead};

/// Reads newline-terminated chunks of at most `buffer_size - 1` bytes
///
/// A line longer than the bound comes back as several chunks; only the last
/// one carries the `\n`. A final line without `\n` is returned as-is.
pub struct LineChunker<R> {
    reader: R,
    limit: usize,
    chunk: Vec<u8>,
}

impl<R: BufRead> LineChunker<R> {
    /// `buffer_size` counts a terminator byte, like a C line buffer
    pub fn new(reader: R, buffer_size: usize) -> Self {
        let limit = buffer_size.saturating_sub(1).max(1);
        Self {
            reader,
            limit,
            chunk: Vec::with_capacity(limit),
        }
    }

    /// Next chunk, or `None` at end of stream
    pub fn next_chunk(&mut self) -> io::Result<Option<&[u8]>> {
        self.chunk.clear();

        while self.chunk.len() < self.limit {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                break;
            }

            let room = self.limit - self.chunk.len();
            let window = &available[..available.len().min(room)];
            let (taken, saw_newline) = match window.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (window.len(), false),
            };
            self.chunk.extend_from_slice(&window[..taken]);
            self.reader.consume(taken);

            if saw_newline {
                break;
            }
        }

        if self.chunk.is_empty() {
            Ok(None)
        } else {
            Ok(Some(&self.chunk))
        }
    }
}
