//! Nested query - scopes an inner query to a nested object collection

use crate::query::ast::{with_boost, wrap, QueryNode};
use serde_json::{json, Map, Value};

/// Query that matches documents with at least one nested object satisfying the inner query
///
/// All clauses of the inner query are evaluated against the same nested object, which
/// is what makes "this user has this permission" work over a list of permission entries.
#[derive(Clone, Debug)]
pub struct NestedQuery {
    /// Path of the nested object collection (e.g. `userPermissions`)
    pub path: String,
    /// Query evaluated against each nested object
    pub query: Box<dyn QueryNode>,
    /// How nested hit scores roll up into the parent (avg, max, min, sum, none)
    pub score_mode: Option<String>,
    /// Boost factor for scoring
    pub boost: f32,
}

impl NestedQuery {
    /// Create a new nested query
    pub fn new(path: impl Into<String>, query: impl QueryNode + 'static) -> Self {
        Self::boxed(path, Box::new(query))
    }

    /// Create a new nested query around an already boxed inner query
    pub fn boxed(path: impl Into<String>, query: Box<dyn QueryNode>) -> Self {
        Self {
            path: path.into(),
            query,
            score_mode: None,
            boost: 1.0,
        }
    }

    /// Set the score mode
    pub fn with_score_mode(mut self, score_mode: impl Into<String>) -> Self {
        self.score_mode = Some(score_mode.into());
        self
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl QueryNode for NestedQuery {
    fn source(&self) -> Value {
        let mut body = Map::new();
        body.insert("path".to_string(), json!(self.path));
        body.insert("query".to_string(), self.query.source());
        if let Some(ref mode) = self.score_mode {
            body.insert("score_mode".to_string(), json!(mode));
        }
        wrap("nested", with_boost(body, self.boost))
    }

    fn query_type(&self) -> &'static str {
        "nested"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
