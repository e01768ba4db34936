//! Wildcard query - matches terms using wildcards
//!
//! Supports:
//! - `*` - matches any sequence of characters
//! - `?` - matches any single character
//!
//! # Example
//!
//! ```rust
//! use querydsl::query::nodes::WildcardQuery;
//!
//! let query = WildcardQuery::new("userPermissions.user", "alice#*");
//! assert!(query.has_wildcards());
//! ```

use crate::query::ast::{with_boost, wrap, QueryNode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Query that matches terms using wildcard patterns
///
/// The pattern can include:
/// - `*` to match any sequence of characters (including empty)
/// - `?` to match exactly one character
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WildcardQuery {
    /// Field to search in
    pub field: String,
    /// Wildcard pattern
    pub pattern: String,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_boost() -> f32 {
    1.0
}

impl WildcardQuery {
    /// Create a new wildcard query
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: pattern.into(),
            boost: 1.0,
        }
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Extract the literal prefix from the pattern
    ///
    /// Returns the longest prefix before the first wildcard character.
    pub fn extract_prefix(&self) -> Option<String> {
        let prefix: String = self
            .pattern
            .chars()
            .take_while(|ch| *ch != '*' && *ch != '?')
            .collect();

        if prefix.is_empty() {
            None
        } else {
            Some(prefix)
        }
    }

    /// Check if the pattern has any wildcards
    pub fn has_wildcards(&self) -> bool {
        self.pattern.contains('*') || self.pattern.contains('?')
    }
}

impl QueryNode for WildcardQuery {
    fn source(&self) -> Value {
        let mut spec = Map::new();
        spec.insert("wildcard".to_string(), json!(self.pattern));

        let mut body = Map::new();
        body.insert(self.field.clone(), Value::Object(with_boost(spec, self.boost)));
        wrap("wildcard", body)
    }

    fn query_type(&self) -> &'static str {
        "wildcard"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
