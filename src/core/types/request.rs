//! Request parameters for one logical HTTP request.

use bytes::Bytes;
use reqwest::Method;

/// One logical request issued through a [`Network`](crate::core::traits::Network).
///
/// `retries` counts the 429 answers seen so far for this request. The
/// executor bumps it before every re-issue and never resets it, so after a
/// successful call it tells how many times the request was rate limited.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub url: String,
    pub body: Bytes,
    /// Extra header pairs, applied after the default content type.
    pub headers: Vec<(String, String)>,
    pub retries: u32,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            url: String::new(),
            body: Bytes::new(),
            headers: Vec::new(),
            retries: 0,
        }
    }
}

impl RequestOptions {
    #[inline]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    #[inline]
    pub fn post(url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self::new(Method::POST, url).with_body(body)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Look up a caller-supplied header, ignoring case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Whether a body should be sent with this request.
    #[inline]
    pub fn has_body(&self) -> bool {
        self.method != Method::GET && !self.body.is_empty()
    }
}
