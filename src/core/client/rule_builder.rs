//! Request bodies for creating and deleting stream rules.
//!
//! # Examples
//!
//! ```
//! use twitstream::{DeleteRulesRequest, RuleBuilder};
//!
//! let create = RuleBuilder::new()
//!     .add_rule("cats has:images", "cat pictures")
//!     .add_rule("dogs", "dog tweets")
//!     .build();
//! assert_eq!(
//!     serde_json::to_string(&create).unwrap(),
//!     r#"{"add":[{"value":"cats has:images","tag":"cat pictures"},{"value":"dogs","tag":"dog tweets"}]}"#
//! );
//!
//! let delete = DeleteRulesRequest::new(["1165037377523306498"]);
//! assert_eq!(
//!     serde_json::to_string(&delete).unwrap(),
//!     r#"{"delete":{"ids":["1165037377523306498"]}}"#
//! );
//! ```

use serde::{Deserialize, Serialize};

/// A rule to add: the filter expression and a label echoed back on matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleValue {
    pub value: String,
    pub tag: String,
}

/// Body of a create request, `{"add":[...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRulesRequest {
    pub add: Vec<RuleValue>,
}

impl CreateRulesRequest {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty()
    }
}

/// Accumulates rules for a single create request.
#[derive(Debug, Clone, Default)]
pub struct RuleBuilder {
    rules: Vec<RuleValue>,
}

impl RuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(mut self, value: impl Into<String>, tag: impl Into<String>) -> Self {
        self.rules.push(RuleValue {
            value: value.into(),
            tag: tag.into(),
        });
        self
    }

    pub fn build(self) -> CreateRulesRequest {
        CreateRulesRequest { add: self.rules }
    }
}

/// Ids of the rules to delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteIds {
    pub ids: Vec<String>,
}

/// Body of a delete request, `{"delete":{"ids":[...]}}`.
///
/// Rule ids are 64-bit integers the API returns as strings; they are kept as
/// strings so they round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRulesRequest {
    pub delete: DeleteIds,
}

impl DeleteRulesRequest {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DeleteRulesRequest {
            delete: DeleteIds {
                ids: ids.into_iter().map(Into::into).collect(),
            },
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.delete.ids.is_empty()
    }
}
