//! HTTP response with an unconsumed body.
//!
//! The executor hands back responses whose body has not been read yet, so the
//! stream session can keep reading from the open connection while one-shot
//! callers (rules, token) drain it with [`HttpResponse::json`].

use crate::core::error::{Result, StreamError};
use bytes::Bytes;
use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use tokio::io::{AsyncBufRead, AsyncReadExt};
use tokio_util::io::StreamReader;

/// A response body that is read incrementally.
pub type BodyReader = Box<dyn AsyncBufRead + Send + Unpin>;

/// HTTP response returned by a [`Network`](crate::core::traits::Network).
pub struct HttpResponse {
    pub status: u16,
    /// Response headers, keys lower-cased.
    pub headers: BTreeMap<String, String>,
    body: BodyReader,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    pub fn new<R>(status: u16, body: R) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        Self {
            status,
            headers: BTreeMap::new(),
            body: Box::new(body),
        }
    }

    /// Build a response whose body is already fully known.
    pub fn from_bytes(status: u16, body: impl Into<Bytes>) -> Self {
        Self::new(status, Cursor::new(body.into()))
    }

    /// Adapt a `reqwest` response, keeping its body as a live byte stream.
    pub fn from_reqwest(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let mut headers = BTreeMap::new();
        for (k, v) in response.headers() {
            if let Ok(val) = v.to_str() {
                headers.insert(k.as_str().to_string(), val.to_string());
            }
        }

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        Self {
            status,
            headers,
            body: Box::new(StreamReader::new(Box::pin(stream))),
        }
    }

    pub fn with_header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    #[inline]
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Give up the response metadata and keep only the body reader.
    pub fn into_body(self) -> BodyReader {
        self.body
    }

    /// Read the whole body.
    pub async fn bytes(mut self) -> Result<Bytes> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf).await?;
        Ok(Bytes::from(buf))
    }

    /// Read the whole body as text, replacing invalid UTF-8.
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read the whole body and decode it as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(StreamError::Json)
    }
}
