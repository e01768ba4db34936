//! Abstract Syntax Tree for backend query representation
//!
//! This module defines the core `QueryNode` trait that all backend query types implement,
//! providing a unified interface for composing queries and rendering them into the
//! search backend's native JSON.

use serde_json::{json, Map, Value};
use std::fmt::Debug;

/// A compiled, composable backend query
pub type BackendQuery = Box<dyn QueryNode>;

/// Core trait for all query nodes in the AST
///
/// Query nodes form a tree structure that mirrors the backend's boolean query
/// grammar. Nodes are immutable once built; parents take ownership of their
/// children when folding them into a boolean or nested query.
pub trait QueryNode: Send + Sync + Debug {
    /// Render this node as the backend's native query JSON
    fn source(&self) -> Value;

    /// Get the query type name (the top-level key of the rendered source)
    fn query_type(&self) -> &'static str;

    /// Get the boost factor for this query
    fn boost(&self) -> f32 {
        1.0
    }

    /// Clone this query node into a boxed trait object
    fn clone_box(&self) -> Box<dyn QueryNode>;
}

impl Clone for Box<dyn QueryNode> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Insert a boost into a rendered body unless it is the neutral 1.0
pub(crate) fn with_boost(mut body: Map<String, Value>, boost: f32) -> Map<String, Value> {
    if boost != 1.0 {
        body.insert("boost".to_string(), json!(boost));
    }
    body
}

/// Wrap a body under its query type key: `{ "<type>": body }`
pub(crate) fn wrap(query_type: &str, body: impl Into<Value>) -> Value {
    let mut outer = Map::new();
    outer.insert(query_type.to_string(), body.into());
    Value::Object(outer)
}

/// A query that matches all documents
#[derive(Clone, Debug)]
pub struct MatchAllQuery {
    pub boost: f32,
}

impl Default for MatchAllQuery {
    fn default() -> Self {
        Self { boost: 1.0 }
    }
}

impl MatchAllQuery {
    /// Create a new match-all query
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl QueryNode for MatchAllQuery {
    fn source(&self) -> Value {
        wrap("match_all", with_boost(Map::new(), self.boost))
    }

    fn query_type(&self) -> &'static str {
        "match_all"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
