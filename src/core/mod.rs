//! Filtered-stream protocol plumbing.
//!
//! # Modules
//!
//! - [`client`] - Executor, frame reader, stream session, rules and tokens
//! - [`types`] - Request, response and message types
//! - [`traits`] - The [`Network`](traits::Network) seam
//! - [`error`] - Error type and `Result` alias

pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Result, StreamError};
pub use traits::Network;
pub use types::{HttpResponse, RequestOptions, StreamMessage};
