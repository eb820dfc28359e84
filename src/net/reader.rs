//! Line-buffered reading over a byte stream.

use std::io::{self, BufRead, BufReader, Read};

/// Maximum accepted line length in bytes, terminator included.
pub const MAX_LINE_LENGTH: usize = 1024;

/// Outcome of reading one line from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A complete line with its CRLF (or bare LF) terminator stripped.
    Complete(String),
    /// The raw line exceeded the maximum length. The oversized input has
    /// been drained through its newline so the session can answer with a
    /// length error and keep going.
    TooLong,
    /// The peer closed the connection.
    Eof,
}

/// Returns one terminated line at a time, enforcing [`MAX_LINE_LENGTH`].
///
/// Invalid UTF-8 is replaced lossily rather than killing the session.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
    max_len: usize,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_max_length(inner, MAX_LINE_LENGTH)
    }

    pub fn with_max_length(inner: R, max_len: usize) -> Self {
        Self {
            inner: BufReader::new(inner),
            buf: Vec::new(),
            max_len,
        }
    }

    /// Reads the next line. Transport errors are returned as-is; sessions
    /// treat them the same way as [`Line::Eof`] and end.
    pub fn read_line(&mut self) -> io::Result<Line> {
        self.buf.clear();
        let mut total = 0usize;

        loop {
            let available = self.inner.fill_buf()?;
            if available.is_empty() {
                if total == 0 {
                    return Ok(Line::Eof);
                }
                break;
            }

            let (used, terminated) = match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), false),
            };

            // Oversized input is counted but not retained.
            if total <= self.max_len {
                self.buf.extend_from_slice(&available[..used]);
            }
            total += used;
            self.inner.consume(used);

            if terminated {
                break;
            }
        }

        if total > self.max_len {
            return Ok(Line::TooLong);
        }

        let mut line = String::from_utf8_lossy(&self.buf).into_owned();
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Line::Complete(line))
    }
}
