//! Error types for filtered-stream operations.
//!
//! This module defines every error that can surface from the client, the
//! request executor and a running stream session. The [`Result`] alias is the
//! shorthand used throughout the crate.
//!
//! # Error Categories
//!
//! | Category | Variants | Retryable |
//! |----------|----------|-----------|
//! | Transport | `Transport` | No (surfaced immediately) |
//! | Rate limit | `RateLimited` | Only by starting over |
//! | Client/server | `Network` | No |
//! | Framing | `Io`, `EndOfStream` | No, terminal for the session |
//! | Decode | `Decode` | Session continues |
//! | Configuration | `Config`, `Url` | No |
//! | Lifecycle | `AlreadyStarted`, `NotBound` | No |
//!
//! # Examples
//!
//! ```
//! use twitstream::StreamError;
//!
//! let err = StreamError::Network { status: 503, body: "over capacity".into() };
//! assert!(err.is_retryable());
//! assert!(err.to_string().contains("over capacity"));
//! ```

use std::io;
use thiserror::Error;

/// Result type for filtered-stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;

/// Errors that can occur while talking to the streaming API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StreamError {
    /// The request never produced a response (connect, DNS, TLS).
    ///
    /// Transport failures are not retried by the executor.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a status >= 400 other than 429.
    ///
    /// `body` holds the response body as diagnostic text.
    #[error("Network request failed with status {status}: {body}")]
    Network { status: u16, body: String },

    /// The server kept answering 429 until the configured retry cap ran out.
    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    /// Reading the stream body failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream body ended cleanly. Delivered as the terminal message of a
    /// session.
    #[error("Stream ended")]
    EndOfStream,

    /// The caller-supplied decode hook rejected a message.
    ///
    /// This never stops a session.
    #[error("Decode error: {0}")]
    Decode(String),

    /// JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An endpoint or query could not be turned into a URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `start()` was called on a session that already ran.
    #[error("Stream already started")]
    AlreadyStarted,

    /// The frame reader was asked for a message before a body was bound.
    #[error("No stream body bound to reader")]
    NotBound,
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        StreamError::Transport(err.to_string())
    }
}

impl StreamError {
    /// Check if starting the same request again may succeed.
    ///
    /// Returns `true` for transport failures, read failures, a clean end of
    /// stream, exhausted rate limiting and 5xx answers. Returns `false` for
    /// client errors, decode errors and misuse of the API.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Transport(_)
            | StreamError::Io(_)
            | StreamError::EndOfStream
            | StreamError::RateLimited { .. } => true,
            StreamError::Network { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if this is an access denied error (HTTP 401 or 403).
    #[inline]
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        matches!(self, StreamError::Network { status: 401 | 403, .. })
    }

    /// Check if this error ends a stream session.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamError::Decode(_))
    }
}
