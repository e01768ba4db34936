//! Boolean query - combines multiple clauses with AND, OR, NOT semantics

use crate::query::ast::{with_boost, wrap, QueryNode};
use crate::query::types::MinimumShouldMatch;
use serde_json::{Map, Value};

/// Boolean query combining multiple clauses
///
/// The boolean query supports three types of clauses:
/// - `must`: All clauses must match (AND).
/// - `should`: At least `minimum_should_match` clauses should match (OR).
/// - `must_not`: No clause may match (NOT).
///
/// A boolean query with no clauses at all matches every document.
///
/// # Example
///
/// ```json
/// {
///   "bool": {
///     "must": [
///       { "prefix": { "path": "/iplant/home" } }
///     ],
///     "should": [
///       { "term": { "tags": "tutorial" } }
///     ],
///     "must_not": [
///       { "term": { "status": "draft" } }
///     ],
///     "minimum_should_match": 1
///   }
/// }
/// ```
#[derive(Clone, Debug)]
pub struct BoolQuery {
    /// Clauses that must match (AND)
    pub must: Vec<Box<dyn QueryNode>>,
    /// Clauses where at least `minimum_should_match` should match (OR)
    pub should: Vec<Box<dyn QueryNode>>,
    /// Clauses that must not match (NOT)
    pub must_not: Vec<Box<dyn QueryNode>>,
    /// Minimum number of should clauses that must match, if set explicitly
    pub minimum_should_match: Option<MinimumShouldMatch>,
    /// Boost factor for scoring
    pub boost: f32,
}

impl Default for BoolQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl BoolQuery {
    /// Create a new empty boolean query
    pub fn new() -> Self {
        Self {
            must: Vec::new(),
            should: Vec::new(),
            must_not: Vec::new(),
            minimum_should_match: None,
            boost: 1.0,
        }
    }

    /// Add a must clause
    pub fn must(mut self, query: impl QueryNode + 'static) -> Self {
        self.must.push(Box::new(query));
        self
    }

    /// Add a should clause
    pub fn should(mut self, query: impl QueryNode + 'static) -> Self {
        self.should.push(Box::new(query));
        self
    }

    /// Add a must_not clause
    pub fn must_not(mut self, query: impl QueryNode + 'static) -> Self {
        self.must_not.push(Box::new(query));
        self
    }

    /// Add a must clause (boxed)
    pub fn must_boxed(mut self, query: Box<dyn QueryNode>) -> Self {
        self.must.push(query);
        self
    }

    /// Add a should clause (boxed)
    pub fn should_boxed(mut self, query: Box<dyn QueryNode>) -> Self {
        self.should.push(query);
        self
    }

    /// Add a must_not clause (boxed)
    pub fn must_not_boxed(mut self, query: Box<dyn QueryNode>) -> Self {
        self.must_not.push(query);
        self
    }

    /// Set minimum should match
    pub fn with_minimum_should_match(mut self, msm: MinimumShouldMatch) -> Self {
        self.minimum_should_match = Some(msm);
        self
    }

    /// Set boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Check if this is an empty query
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }
}

fn render_section(body: &mut Map<String, Value>, key: &str, clauses: &[Box<dyn QueryNode>]) {
    if !clauses.is_empty() {
        let rendered = clauses.iter().map(|q| q.source()).collect();
        body.insert(key.to_string(), Value::Array(rendered));
    }
}

impl QueryNode for BoolQuery {
    fn source(&self) -> Value {
        let mut body = Map::new();
        render_section(&mut body, "must", &self.must);
        render_section(&mut body, "should", &self.should);
        render_section(&mut body, "must_not", &self.must_not);

        if let Some(ref msm) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), msm.to_json());
        }

        wrap("bool", with_boost(body, self.boost))
    }

    fn query_type(&self) -> &'static str {
        "bool"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::nodes::TermQuery;
    use serde_json::json;

    #[test]
    fn test_bool_query_creation() {
        let query = BoolQuery::new()
            .must(TermQuery::new("content", "rust"))
            .should(TermQuery::new("tags", "tutorial"))
            .must_not(TermQuery::new("status", "draft"));

        assert_eq!(query.must.len(), 1);
        assert_eq!(query.should.len(), 1);
        assert_eq!(query.must_not.len(), 1);
        assert!(!query.is_empty());
    }

    #[test]
    fn test_bool_query_empty_matches_everything() {
        let query = BoolQuery::new();
        assert!(query.is_empty());
        assert_eq!(query.source(), json!({ "bool": {} }));
    }

    #[test]
    fn test_bool_query_source() {
        let query = BoolQuery::new()
            .must(TermQuery::new("user", "alice"))
            .should(TermQuery::new("tags", "a"))
            .should(TermQuery::new("tags", "b"))
            .must_not(TermQuery::new("status", "draft"))
            .with_minimum_should_match(MinimumShouldMatch::Count(1));

        assert_eq!(
            query.source(),
            json!({
                "bool": {
                    "must": [{ "term": { "user": "alice" } }],
                    "should": [
                        { "term": { "tags": "a" } },
                        { "term": { "tags": "b" } }
                    ],
                    "must_not": [{ "term": { "status": "draft" } }],
                    "minimum_should_match": 1
                }
            })
        );
    }

    #[test]
    fn test_bool_query_single_clause_is_still_array() {
        let query = BoolQuery::new().must(TermQuery::new("user", "alice"));
        assert!(query.source()["bool"]["must"].is_array());
    }

    #[test]
    fn test_bool_query_type() {
        let query = BoolQuery::new();
        assert_eq!(query.query_type(), "bool");
    }

    #[test]
    fn test_bool_query_clone() {
        let query = BoolQuery::new()
            .must(TermQuery::new("content", "rust"))
            .with_boost(2.0);

        let cloned = query.clone_box();
        assert_eq!(cloned.query_type(), "bool");
        assert_eq!(cloned.boost(), 2.0);
        assert_eq!(cloned.source()["bool"]["boost"], json!(2.0));
    }
}
