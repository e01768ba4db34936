//! Prefix query - matches terms starting with a prefix
//!
//! A prefix query matches all terms that begin with the specified prefix.
//! This is cheaper for the backend than a wildcard query with a trailing `*`.
//!
//! # Example
//!
//! ```rust
//! use querydsl::query::nodes::PrefixQuery;
//!
//! // Match every object under a collection
//! let query = PrefixQuery::new("path", "/iplant/home/alice");
//! ```

use crate::query::ast::{with_boost, wrap, QueryNode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Query that matches terms starting with a prefix
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrefixQuery {
    /// Field to search in
    pub field: String,
    /// Prefix to match
    pub prefix: String,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_boost() -> f32 {
    1.0
}

impl PrefixQuery {
    /// Create a new prefix query
    pub fn new(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            prefix: prefix.into(),
            boost: 1.0,
        }
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl QueryNode for PrefixQuery {
    fn source(&self) -> Value {
        let spec = if self.boost == 1.0 {
            json!(self.prefix)
        } else {
            let mut spec = Map::new();
            spec.insert("value".to_string(), json!(self.prefix));
            Value::Object(with_boost(spec, self.boost))
        };

        let mut body = Map::new();
        body.insert(self.field.clone(), spec);
        wrap("prefix", body)
    }

    fn query_type(&self) -> &'static str {
        "prefix"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
