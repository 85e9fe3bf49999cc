//! twitstream: a client for the v2 filtered-stream API.
//!
//! The crate opens the long-lived stream connection, frames the body into
//! messages, backs off when the API rate limits, and manages the rules that
//! decide which posts are delivered.
//!
//! - **core::client**: executor, frame reader, stream session, rules, tokens.
//! - **core::types**: request/response/message types.
//! - **core::traits**: the `Network` seam used for mocking.

pub mod core;

// Top-level re-exports for common usage
pub use crate::core::error::{Result, StreamError};
pub use crate::core::traits::Network;
pub use crate::core::types;
pub use crate::core::types::{HttpResponse, RequestOptions, StreamMessage};

pub use crate::core::client;
pub use crate::core::client::{
    BearerToken, ClientConfig, CreateRulesRequest, DeleteRulesRequest, Endpoints, FrameReader,
    HttpExecutor, Messages, RuleBuilder, RuleResponse, Rules, Stream, StreamQuery, StreamState,
    TokenGenerator, TwitterApi,
};
