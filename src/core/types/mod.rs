//! Core data types for the filtered-stream client.
//!
//! # Type Overview
//!
//! ```text
//! RequestOptions ──► Network::execute ──► HttpResponse
//!                                            │ body
//!                                            ▼
//!                                       FrameReader ──► StreamMessage<T>
//! ```
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RequestOptions`] | One logical request, including its rate-limit retry count |
//! | [`HttpResponse`] | Status, headers and an unconsumed body reader |
//! | [`StreamMessage`] | A framed payload or the error that replaced it |

mod message;
mod request;
mod response;

pub use message::StreamMessage;
pub use request::RequestOptions;
pub use response::{BodyReader, HttpResponse};

pub use bytes::Bytes;
