//! Query parameters for the stream request.
//!
//! The stream endpoint accepts extra fields and expansions as comma-separated
//! lists, e.g. `expansions=author_id&tweet.fields=created_at`. [`StreamQuery`]
//! collects them and encodes them with sorted keys so the resulting URL is
//! stable.
//!
//! # Examples
//!
//! ```
//! use twitstream::StreamQuery;
//!
//! let query = StreamQuery::new()
//!     .add_expansion("author_id")
//!     .add_tweet_field("created_at")
//!     .add_tweet_field("lang");
//!
//! assert_eq!(
//!     query.build(),
//!     "expansions=author_id&tweet.fields=created_at%2Clang"
//! );
//! ```

use std::collections::BTreeMap;
use url::form_urlencoded;

const BACKFILL_MINUTES: &str = "backfill_minutes";
const EXPANSIONS: &str = "expansions";
const MEDIA_FIELDS: &str = "media.fields";
const PLACE_FIELDS: &str = "place.fields";
const POLL_FIELDS: &str = "poll.fields";
const TWEET_FIELDS: &str = "tweet.fields";
const USER_FIELDS: &str = "user.fields";

/// Builder for the stream request's query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamQuery {
    params: BTreeMap<&'static str, Vec<String>>,
}

impl StreamQuery {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.entry(key).or_default().push(value.into());
        self
    }

    /// Ask the server to replay up to `minutes` of missed messages after a
    /// reconnect.
    pub fn backfill_minutes(mut self, minutes: u32) -> Self {
        self.params
            .insert(BACKFILL_MINUTES, vec![minutes.to_string()]);
        self
    }

    /// Expand an object referenced by id, e.g. `author_id`.
    pub fn add_expansion(self, expansion: impl Into<String>) -> Self {
        self.push(EXPANSIONS, expansion)
    }

    /// Only delivered when `attachments.media_keys` is expanded.
    pub fn add_media_field(self, field: impl Into<String>) -> Self {
        self.push(MEDIA_FIELDS, field)
    }

    /// Only delivered when `geo.place_id` is expanded.
    pub fn add_place_field(self, field: impl Into<String>) -> Self {
        self.push(PLACE_FIELDS, field)
    }

    pub fn add_poll_field(self, field: impl Into<String>) -> Self {
        self.push(POLL_FIELDS, field)
    }

    pub fn add_tweet_field(self, field: impl Into<String>) -> Self {
        self.push(TWEET_FIELDS, field)
    }

    pub fn add_user_field(self, field: impl Into<String>) -> Self {
        self.push(USER_FIELDS, field)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Encode the parameters, keys in lexical order, values comma-joined.
    pub fn build(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.params {
            serializer.append_pair(key, &values.join(","));
        }
        serializer.finish()
    }
}
