//! Term query - exact match on a field

use crate::query::ast::{with_boost, wrap, QueryNode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Query that matches documents containing an exact term in a field
///
/// The term is not analyzed; it must match the indexed keyword verbatim.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TermQuery {
    /// Field to search in
    pub field: String,
    /// Exact term to match
    pub term: String,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_boost() -> f32 {
    1.0
}

impl TermQuery {
    /// Create a new term query
    pub fn new(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            term: term.into(),
            boost: 1.0,
        }
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl QueryNode for TermQuery {
    fn source(&self) -> Value {
        // Plain form unless a boost forces the object form
        let spec = if self.boost == 1.0 {
            json!(self.term)
        } else {
            let mut spec = Map::new();
            spec.insert("value".to_string(), json!(self.term));
            Value::Object(with_boost(spec, self.boost))
        };

        let mut body = Map::new();
        body.insert(self.field.clone(), spec);
        wrap("term", body)
    }

    fn query_type(&self) -> &'static str {
        "term"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
