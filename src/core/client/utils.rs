//! Utility functions for the stream client.

use crate::core::error::{Result, StreamError};
use std::time::Duration;
use url::Url;

/// Append an encoded query string to `endpoint`.
///
/// An empty query leaves the endpoint untouched.
pub fn url_with_query(endpoint: &str, query: &str) -> Result<String> {
    let mut url = Url::parse(endpoint)?;
    if !query.is_empty() {
        let query = query.trim_start_matches('?');
        match url.query() {
            Some(existing) if !existing.is_empty() => {
                let joined = format!("{}&{}", existing, query);
                url.set_query(Some(&joined));
            }
            _ => url.set_query(Some(query)),
        }
    }
    Ok(url.into())
}

/// `endpoint?dry_run=true` when `dry_run` is set.
pub fn url_with_dry_run(endpoint: &str, dry_run: bool) -> Result<String> {
    if dry_run {
        url_with_query(endpoint, "dry_run=true")
    } else {
        Url::parse(endpoint)
            .map(String::from)
            .map_err(StreamError::Url)
    }
}

pub fn spawn_task<F>(future: F) -> tokio::task::JoinHandle<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future)
}

pub async fn sleep(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
