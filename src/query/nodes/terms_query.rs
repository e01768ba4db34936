//! Terms query - matches documents containing any of the specified terms

use crate::query::ast::{with_boost, wrap, QueryNode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Query that matches documents containing any of the specified terms in a field
///
/// This is equivalent to a boolean OR of multiple term queries, but is sent to the
/// backend as a single clause.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TermsQuery {
    /// Field to search in
    pub field: String,
    /// Terms to match (document must contain at least one)
    pub terms: Vec<String>,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_boost() -> f32 {
    1.0
}

impl TermsQuery {
    /// Create a new terms query
    pub fn new(field: impl Into<String>, terms: Vec<String>) -> Self {
        Self {
            field: field.into(),
            terms,
            boost: 1.0,
        }
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Add a term to the query
    pub fn add_term(mut self, term: impl Into<String>) -> Self {
        self.terms.push(term.into());
        self
    }
}

impl QueryNode for TermsQuery {
    fn source(&self) -> Value {
        let mut body = Map::new();
        body.insert(self.field.clone(), json!(self.terms));
        wrap("terms", with_boost(body, self.boost))
    }

    fn query_type(&self) -> &'static str {
        "terms"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
