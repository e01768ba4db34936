//! Query string query - backend-parsed Lucene syntax restricted to fields

use crate::query::ast::{with_boost, wrap, QueryNode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Query whose text is parsed by the backend's query string syntax
///
/// Used for free-text clauses where implicit wildcards (`*foo*`) and `OR`
/// operators should be interpreted by the backend rather than by the compiler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryStringQuery {
    /// Query text in query string syntax
    pub query: String,
    /// Fields the query is restricted to
    pub fields: Vec<String>,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_boost() -> f32 {
    1.0
}

impl QueryStringQuery {
    /// Create a new query string query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            fields: Vec::new(),
            boost: 1.0,
        }
    }

    /// Restrict the query to a field
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl QueryNode for QueryStringQuery {
    fn source(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), json!(self.query));
        if !self.fields.is_empty() {
            body.insert("fields".to_string(), json!(self.fields));
        }
        wrap("query_string", with_boost(body, self.boost))
    }

    fn query_type(&self) -> &'static str {
        "query_string"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
