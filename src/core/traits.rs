use crate::core::error::Result;
use crate::core::types::{HttpResponse, RequestOptions};
use async_trait::async_trait;
use std::sync::Arc;

/// Abstraction for issuing authenticated requests.
///
/// Implementations own retry behaviour: `opts.retries` is updated in place so
/// the caller can see how often the request was rate limited.
#[async_trait]
pub trait Network: Send + Sync + 'static {
    /// Perform one logical request and return the response with its body
    /// still open.
    async fn execute(&self, opts: &mut RequestOptions) -> Result<HttpResponse>;
}

#[async_trait]
impl<N: Network + ?Sized> Network for Arc<N> {
    async fn execute(&self, opts: &mut RequestOptions) -> Result<HttpResponse> {
        (**self).execute(opts).await
    }
}
