//! Filtered-stream client implementation.
//!
//! This module contains everything needed to talk to the v2 filtered-stream
//! API:
//!
//! - **Issue requests** with a bearer token and back off on HTTP 429
//! - **Frame the stream body** into messages, tolerating embedded newlines
//! - **Run a stream session** on a background task with a one-slot queue
//! - **Manage rules** that decide what the stream delivers
//! - **Request bearer tokens** from an API key and secret
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── api          - TwitterApi facade
//! ├── config       - Client configuration and endpoint table
//! ├── executor     - reqwest-backed Network with 429 backoff
//! ├── query        - Stream query parameters
//! ├── reader       - CRLF frame reader
//! ├── retry        - Backoff schedule
//! ├── rule_builder - Create/delete request bodies
//! ├── rules        - Rules endpoint client
//! ├── signal       - One-shot stop signal
//! ├── stream       - Stream session lifecycle
//! ├── token        - Bearer token generation
//! └── utils        - URL helpers and task spawning
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TwitterApi`] | Rules and stream over one executor |
//! | [`HttpExecutor`] | Authenticated request executor |
//! | [`FrameReader`] | Splits a live body into messages |
//! | [`Stream`] | One streaming session |
//! | [`Rules`] | List, create and delete rules |
//! | [`TokenGenerator`] | Bearer token from key and secret |
//! | [`ClientConfig`] | Client configuration options |
//!
//! # Examples
//!
//! ## Backoff Schedule
//!
//! ```
//! use twitstream::client::backoff_delay;
//! use std::time::Duration;
//!
//! assert_eq!(backoff_delay(0), Duration::ZERO);
//! assert_eq!(backoff_delay(2), Duration::from_secs(1));
//! assert_eq!(backoff_delay(6), Duration::from_secs(30));
//! ```

mod api;
mod config;
mod executor;
mod query;
mod reader;
pub mod retry;
mod rule_builder;
mod rules;
mod signal;
mod stream;
mod token;
mod utils;

pub use api::TwitterApi;
pub use config::{ClientConfig, Endpoints, DEFAULT_RULES_URL, DEFAULT_STREAM_URL, DEFAULT_TOKEN_URL};
pub use executor::HttpExecutor;
pub use query::StreamQuery;
pub use reader::FrameReader;
pub use retry::{backoff_delay, backoff_delay_with_ceiling, RetryDecision, RetryPolicy, BACKOFF_CEILING};
pub use rule_builder::{CreateRulesRequest, DeleteIds, DeleteRulesRequest, RuleBuilder, RuleValue};
pub use rules::{RuleData, RuleError, RuleMeta, RuleResponse, RuleSummary, Rules};
pub use signal::StopSignal;
pub use stream::{DecodeHook, Messages, Stream, StreamState};
pub use token::{BearerToken, TokenGenerator};
pub use utils::{url_with_dry_run, url_with_query};
