//! Incremental frame reader for the stream body.
//!
//! The stream delivers one JSON record per message, separated by `\r\n`. A
//! record may itself contain bare `\n` characters, so a boundary cannot be
//! found by scanning for a single byte. The reader instead splits the body
//! into `\n`-terminated lines and only ends a message at a line whose last
//! two bytes are `\r\n`.
//!
//! # Framing Rules
//!
//! | Input | Result |
//! |-------|--------|
//! | `a\r\nb\r\n` | `a`, `b`, end of stream |
//! | `line1\nline2\r\n` | `line1\nline2` |
//! | `\r\n` | empty message (keep-alive) |
//! | `partial` + EOF | `partial`, then end of stream |
//!
//! Keep-alives are returned as empty messages; dropping them is up to the
//! caller.
//!
//! # Examples
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use twitstream::FrameReader;
//!
//! let mut reader = FrameReader::new();
//! reader.bind(&b"{\"id\":1}\r\n\r\n"[..]);
//!
//! assert_eq!(&reader.next().await.unwrap().unwrap()[..], b"{\"id\":1}");
//! assert!(reader.next().await.unwrap().unwrap().is_empty());
//! assert!(reader.next().await.unwrap().is_none());
//! # }
//! ```

use crate::core::error::{Result, StreamError};
use crate::core::types::BodyReader;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const MESSAGE_DELIMITER: &[u8] = b"\r\n";

/// Turns a live response body into discrete messages.
///
/// The reader is not reentrant: [`next`](FrameReader::next) takes `&mut self`
/// and the buffer is never shared.
pub struct FrameReader {
    source: Option<BodyReader>,
    /// Accumulates the lines of the message being framed
    buf: BytesMut,
    /// Scratch space for the line currently being read
    line: Vec<u8>,
}

impl std::fmt::Debug for FrameReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReader")
            .field("bound", &self.source.is_some())
            .field("buffered", &self.buf.len())
            .finish()
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader {
    pub fn new() -> Self {
        FrameReader {
            source: None,
            buf: BytesMut::with_capacity(8192),
            line: Vec::with_capacity(1024),
        }
    }

    /// Attach a new byte source, replacing any previous one.
    ///
    /// Nothing carries over from the previous source: every call to
    /// [`next`](FrameReader::next) starts from an empty buffer.
    pub fn bind<R>(&mut self, source: R)
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        self.source = Some(Box::new(source));
    }

    /// Attach an already boxed body.
    pub fn bind_boxed(&mut self, source: BodyReader) {
        self.source = Some(source);
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.source.is_some()
    }

    /// Read the next message.
    ///
    /// Returns `Ok(Some(bytes))` for a message (possibly empty), `Ok(None)`
    /// once the source is exhausted, or the read error. A read error unbinds
    /// the source, so every later call fails with [`StreamError::NotBound`].
    pub async fn next(&mut self) -> Result<Option<Bytes>> {
        let source = self.source.as_mut().ok_or(StreamError::NotBound)?;

        // Reuse the allocation left behind by the previous message.
        self.buf.clear();

        loop {
            self.line.clear();
            let read = match source.read_until(b'\n', &mut self.line).await {
                Ok(read) => read,
                Err(e) => {
                    self.source = None;
                    return Err(StreamError::Io(e));
                }
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                // Unterminated trailing message.
                break;
            }

            if self.line.ends_with(MESSAGE_DELIMITER) {
                let end = self.line.len() - MESSAGE_DELIMITER.len();
                self.buf.extend_from_slice(&self.line[..end]);
                break;
            }

            self.buf.extend_from_slice(&self.line);
        }

        Ok(Some(self.buf.split().freeze()))
    }
}
