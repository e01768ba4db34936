//! Backend query parser
//!
//! Parses backend-native JSON (the output of [`crate::query::QueryNode::source`]) back into
//! query AST nodes. The syntax is the subset of Elasticsearch Query DSL that
//! the clause processors emit.

use crate::error::QueryDslError;
use crate::query::ast::{BackendQuery, MatchAllQuery};
use crate::query::nodes::{
    BoolQuery, NestedQuery, PrefixQuery, QueryStringQuery, RangeQuery, TermQuery, TermsQuery,
    WildcardQuery,
};
use crate::query::types::{MinimumShouldMatch, RangeBounds, RangeValue};
use crate::Result;
use serde_json::{Map, Value};

/// Query parser for backend JSON
pub struct QueryParser;

impl QueryParser {
    /// Parse a JSON query into an AST node
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "bool": {
    ///     "must": [
    ///       { "prefix": { "path": "/iplant/home" } }
    ///     ],
    ///     "must_not": [
    ///       { "term": { "userPermissions.permission": "read" } }
    ///     ]
    ///   }
    /// }
    /// ```
    pub fn parse(json: &Value) -> Result<BackendQuery> {
        match json {
            Value::Object(map) => Self::parse_query_object(map),
            _ => Err(QueryDslError::InvalidRequest(
                "Query must be a JSON object".to_string(),
            )),
        }
    }

    /// Parse a JSON string into an AST node
    pub fn parse_str(json_str: &str) -> Result<BackendQuery> {
        let value: Value = serde_json::from_str(json_str)
            .map_err(|e| QueryDslError::InvalidRequest(format!("Invalid JSON: {}", e)))?;
        Self::parse(&value)
    }

    fn parse_query_object(map: &Map<String, Value>) -> Result<BackendQuery> {
        // Handle wrapped query: { "query": { ... } }
        if let Some(query) = map.get("query") {
            return Self::parse(query);
        }

        if let Some(bool_query) = map.get("bool") {
            return Self::parse_bool(bool_query);
        }
        if let Some(nested) = map.get("nested") {
            return Self::parse_nested(nested);
        }
        if let Some(term_query) = map.get("term") {
            return Self::parse_term(term_query);
        }
        if let Some(terms_query) = map.get("terms") {
            return Self::parse_terms(terms_query);
        }
        if let Some(wildcard_query) = map.get("wildcard") {
            return Self::parse_wildcard(wildcard_query);
        }
        if let Some(prefix_query) = map.get("prefix") {
            return Self::parse_prefix(prefix_query);
        }
        if let Some(range_query) = map.get("range") {
            return Self::parse_range(range_query);
        }
        if let Some(query_string) = map.get("query_string") {
            return Self::parse_query_string(query_string);
        }
        if let Some(match_all) = map.get("match_all") {
            return Ok(Box::new(
                MatchAllQuery::new().with_boost(Self::parse_boost(match_all.get("boost"))),
            ));
        }

        Err(QueryDslError::InvalidRequest(format!(
            "Unknown query type. Expected one of: bool, nested, term, terms, wildcard, prefix, range, query_string, match_all. Got keys: {:?}",
            map.keys().collect::<Vec<_>>()
        )))
    }

    fn parse_boost(value: Option<&Value>) -> f32 {
        value.and_then(|v| v.as_f64()).unwrap_or(1.0) as f32
    }

    /// Split a `{ "field": spec }` object into its single field and spec
    fn single_field<'a>(value: &'a Value, query_type: &str) -> Result<(&'a String, &'a Value)> {
        let map = value.as_object().ok_or_else(|| {
            QueryDslError::InvalidRequest(format!("{} query must be an object", query_type))
        })?;

        map.iter().find(|(k, _)| *k != "boost").ok_or_else(|| {
            QueryDslError::InvalidRequest(format!("{} query must specify a field", query_type))
        })
    }

    fn scalar_to_string(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => value.to_string(),
        }
    }

    /// Parse a bool query
    fn parse_bool(value: &Value) -> Result<BackendQuery> {
        let map = value.as_object().ok_or_else(|| {
            QueryDslError::InvalidRequest("bool query must be an object".to_string())
        })?;

        let mut query = BoolQuery::new();

        if let Some(must) = map.get("must") {
            query.must = Self::parse_clause_array(must)?;
        }
        if let Some(should) = map.get("should") {
            query.should = Self::parse_clause_array(should)?;
        }
        if let Some(must_not) = map.get("must_not") {
            query.must_not = Self::parse_clause_array(must_not)?;
        }
        if map.contains_key("filter") {
            return Err(QueryDslError::InvalidRequest(
                "bool filter sections are not supported".to_string(),
            ));
        }
        if let Some(msm) = map.get("minimum_should_match") {
            query.minimum_should_match = Some(Self::parse_minimum_should_match(msm)?);
        }
        query.boost = Self::parse_boost(map.get("boost"));

        Ok(Box::new(query))
    }

    /// Parse an array of query clauses
    fn parse_clause_array(value: &Value) -> Result<Vec<BackendQuery>> {
        match value {
            Value::Array(arr) => arr.iter().map(Self::parse).collect(),
            // Single clause can be provided without array wrapper
            obj @ Value::Object(_) => Ok(vec![Self::parse(obj)?]),
            _ => Err(QueryDslError::InvalidRequest(
                "Clause must be an array or object".to_string(),
            )),
        }
    }

    /// Parse minimum_should_match
    fn parse_minimum_should_match(value: &Value) -> Result<MinimumShouldMatch> {
        match value {
            Value::Number(n) => Ok(MinimumShouldMatch::Count(n.as_u64().unwrap_or(1) as usize)),
            Value::String(s) => {
                if s.ends_with('%') {
                    Ok(MinimumShouldMatch::Percentage(s.clone()))
                } else {
                    let count: usize = s.parse().map_err(|_| {
                        QueryDslError::InvalidRequest(format!(
                            "Invalid minimum_should_match: {}",
                            s
                        ))
                    })?;
                    Ok(MinimumShouldMatch::Count(count))
                }
            }
            _ => Err(QueryDslError::InvalidRequest(
                "minimum_should_match must be a number or string".to_string(),
            )),
        }
    }

    /// Parse a nested query
    ///
    /// Format: { "nested": { "path": "userPermissions", "query": { ... } } }
    fn parse_nested(value: &Value) -> Result<BackendQuery> {
        let map = value.as_object().ok_or_else(|| {
            QueryDslError::InvalidRequest("nested query must be an object".to_string())
        })?;

        let path = map.get("path").and_then(|v| v.as_str()).ok_or_else(|| {
            QueryDslError::InvalidRequest("nested query must have a 'path'".to_string())
        })?;
        let inner = map.get("query").ok_or_else(|| {
            QueryDslError::InvalidRequest("nested query must have a 'query'".to_string())
        })?;

        let mut query = NestedQuery::boxed(path, Self::parse(inner)?)
            .with_boost(Self::parse_boost(map.get("boost")));
        if let Some(mode) = map.get("score_mode").and_then(|v| v.as_str()) {
            query = query.with_score_mode(mode);
        }

        Ok(Box::new(query))
    }

    /// Parse a term query
    ///
    /// Format: { "term": { "field": "value" } }
    /// or: { "term": { "field": { "value": "...", "boost": 1.5 } } }
    fn parse_term(value: &Value) -> Result<BackendQuery> {
        let (field, term_spec) = Self::single_field(value, "term")?;

        let (term, boost) = match term_spec {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                (Self::scalar_to_string(term_spec), 1.0)
            }
            Value::Object(spec) => {
                let term = spec.get("value").map(Self::scalar_to_string).ok_or_else(|| {
                    QueryDslError::InvalidRequest(
                        "term query spec must have 'value' field".to_string(),
                    )
                })?;
                (term, Self::parse_boost(spec.get("boost")))
            }
            _ => {
                return Err(QueryDslError::InvalidRequest(
                    "term query value must be a string, number, boolean, or object".to_string(),
                ))
            }
        };

        Ok(Box::new(TermQuery::new(field.clone(), term).with_boost(boost)))
    }

    /// Parse a terms query
    ///
    /// Format: { "terms": { "field": ["value1", "value2", ...] } }
    fn parse_terms(value: &Value) -> Result<BackendQuery> {
        let (field, terms_spec) = Self::single_field(value, "terms")?;

        let terms = match terms_spec {
            Value::Array(arr) => arr.iter().map(Self::scalar_to_string).collect(),
            _ => {
                return Err(QueryDslError::InvalidRequest(
                    "terms query value must be an array".to_string(),
                ))
            }
        };

        let boost = Self::parse_boost(value.get("boost"));
        Ok(Box::new(TermsQuery::new(field.clone(), terms).with_boost(boost)))
    }

    /// Parse a wildcard query
    ///
    /// Format: { "wildcard": { "field": "pattern*" } }
    /// or: { "wildcard": { "field": { "wildcard": "pattern*", "boost": 1.5 } } }
    /// (`value` is accepted in place of `wildcard`)
    fn parse_wildcard(value: &Value) -> Result<BackendQuery> {
        let (field, wildcard_spec) = Self::single_field(value, "wildcard")?;

        let (pattern, boost) = match wildcard_spec {
            Value::String(p) => (p.clone(), 1.0),
            Value::Object(spec) => {
                let pattern = spec
                    .get("wildcard")
                    .or_else(|| spec.get("value"))
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        QueryDslError::InvalidRequest(
                            "wildcard query spec must have a 'wildcard' or 'value' field"
                                .to_string(),
                        )
                    })?
                    .to_string();
                (pattern, Self::parse_boost(spec.get("boost")))
            }
            _ => {
                return Err(QueryDslError::InvalidRequest(
                    "wildcard query value must be a string or object".to_string(),
                ))
            }
        };

        Ok(Box::new(WildcardQuery::new(field.clone(), pattern).with_boost(boost)))
    }

    /// Parse a prefix query
    ///
    /// Format: { "prefix": { "field": "prefix" } }
    /// or: { "prefix": { "field": { "value": "prefix", "boost": 1.5 } } }
    fn parse_prefix(value: &Value) -> Result<BackendQuery> {
        let (field, prefix_spec) = Self::single_field(value, "prefix")?;

        let (prefix, boost) = match prefix_spec {
            Value::String(p) => (p.clone(), 1.0),
            Value::Object(spec) => {
                let prefix = spec
                    .get("value")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        QueryDslError::InvalidRequest(
                            "prefix query spec must have 'value' field".to_string(),
                        )
                    })?
                    .to_string();
                (prefix, Self::parse_boost(spec.get("boost")))
            }
            _ => {
                return Err(QueryDslError::InvalidRequest(
                    "prefix query value must be a string or object".to_string(),
                ))
            }
        };

        Ok(Box::new(PrefixQuery::new(field.clone(), prefix).with_boost(boost)))
    }

    /// Parse a range query
    ///
    /// Format: { "range": { "field": { "gte": ..., "lte": ..., ... } } }
    fn parse_range(value: &Value) -> Result<BackendQuery> {
        let (field, range_spec) = Self::single_field(value, "range")?;

        let spec = range_spec.as_object().ok_or_else(|| {
            QueryDslError::InvalidRequest("range query spec must be an object".to_string())
        })?;

        let bounds = RangeBounds {
            gte: spec.get("gte").map(RangeValue::from_json),
            gt: spec.get("gt").map(RangeValue::from_json),
            lte: spec.get("lte").map(RangeValue::from_json),
            lt: spec.get("lt").map(RangeValue::from_json),
        };

        Ok(Box::new(
            RangeQuery::new(field.clone())
                .with_bounds(bounds)
                .with_boost(Self::parse_boost(spec.get("boost"))),
        ))
    }

    /// Parse a query_string query
    ///
    /// Format: { "query_string": { "query": "*foo*", "fields": ["label"] } }
    fn parse_query_string(value: &Value) -> Result<BackendQuery> {
        let map = value.as_object().ok_or_else(|| {
            QueryDslError::InvalidRequest("query_string query must be an object".to_string())
        })?;

        let text = map.get("query").and_then(|v| v.as_str()).ok_or_else(|| {
            QueryDslError::InvalidRequest("query_string query must have 'query'".to_string())
        })?;

        let mut query = QueryStringQuery::new(text).with_boost(Self::parse_boost(map.get("boost")));
        if let Some(fields) = map.get("fields").and_then(|v| v.as_array()) {
            for field in fields.iter().filter_map(|f| f.as_str()) {
                query = query.field(field);
            }
        }

        Ok(Box::new(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::QueryNode;
    use serde_json::json;

    #[test]
    fn test_parse_term() {
        let json = r#"{ "term": { "status": "published" } }"#;
        let query = QueryParser::parse_str(json).unwrap();
        assert_eq!(query.query_type(), "term");
    }

    #[test]
    fn test_parse_term_with_boost() {
        let json = r#"{ "term": { "status": { "value": "published", "boost": 1.5 } } }"#;
        let query = QueryParser::parse_str(json).unwrap();
        assert_eq!(query.query_type(), "term");
        assert_eq!(query.boost(), 1.5);
    }

    #[test]
    fn test_parse_terms() {
        let json = r#"{ "terms": { "tags": ["rust", "programming", "tutorial"] } }"#;
        let query = QueryParser::parse_str(json).unwrap();
        assert_eq!(query.query_type(), "terms");
    }

    #[test]
    fn test_parse_range() {
        let json = r#"{ "range": { "fileSize": { "gte": 1024, "lte": 4096 } } }"#;
        let query = QueryParser::parse_str(json).unwrap();
        assert_eq!(query.query_type(), "range");
        assert_eq!(
            query.source(),
            json!({ "range": { "fileSize": { "gte": 1024, "lte": 4096 } } })
        );
    }

    #[test]
    fn test_parse_wildcard_both_spellings() {
        let a = QueryParser::parse_str(r#"{ "wildcard": { "user": { "wildcard": "a#*" } } }"#)
            .unwrap();
        let b = QueryParser::parse_str(r#"{ "wildcard": { "user": { "value": "a#*" } } }"#)
            .unwrap();
        let c = QueryParser::parse_str(r#"{ "wildcard": { "user": "a#*" } }"#).unwrap();
        assert_eq!(a.source(), b.source());
        assert_eq!(b.source(), c.source());
    }

    #[test]
    fn test_parse_prefix() {
        let json = r#"{ "prefix": { "path": { "value": "/iplant", "boost": 1.5 } } }"#;
        let query = QueryParser::parse_str(json).unwrap();
        assert_eq!(query.query_type(), "prefix");
        assert_eq!(query.boost(), 1.5);
    }

    #[test]
    fn test_parse_nested_bool() {
        let json = r#"{
            "nested": {
                "path": "userPermissions",
                "query": {
                    "bool": {
                        "must": [
                            { "term": { "userPermissions.permission": "own" } },
                            { "wildcard": { "userPermissions.user": { "wildcard": "mian#*" } } }
                        ]
                    }
                }
            }
        }"#;
        let query = QueryParser::parse_str(json).unwrap();
        assert_eq!(query.query_type(), "nested");
        assert_eq!(query.source(), serde_json::from_str::<Value>(json).unwrap());
    }

    #[test]
    fn test_parse_single_object_section() {
        let json = r#"{ "bool": { "must": { "term": { "tag": "rust" } } } }"#;
        let query = QueryParser::parse_str(json).unwrap();
        assert_eq!(
            query.source(),
            json!({ "bool": { "must": [{ "term": { "tag": "rust" } }] } })
        );
    }

    #[test]
    fn test_parse_bool_with_minimum_should_match() {
        let json = r#"{
            "bool": {
                "should": [
                    { "term": { "tags": "rust" } },
                    { "term": { "tags": "programming" } }
                ],
                "minimum_should_match": "1"
            }
        }"#;
        let query = QueryParser::parse_str(json).unwrap();
        assert_eq!(query.source()["bool"]["minimum_should_match"], json!(1));
    }

    #[test]
    fn test_parse_query_string() {
        let json = r#"{ "query_string": { "query": "*foo*", "fields": ["label"] } }"#;
        let query = QueryParser::parse_str(json).unwrap();
        assert_eq!(query.query_type(), "query_string");
    }

    #[test]
    fn test_parse_match_all_and_wrapped() {
        let query = QueryParser::parse_str(r#"{ "query": { "match_all": {} } }"#).unwrap();
        assert_eq!(query.query_type(), "match_all");
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = QueryParser::parse_str("not valid json");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_unknown_query_type() {
        let json = r#"{ "fuzzy": { "field": "value" } }"#;
        let result = QueryParser::parse_str(json);
        assert!(matches!(result, Err(QueryDslError::InvalidRequest(_))));
    }

    #[test]
    fn test_parse_bool_filter_rejected() {
        let json = r#"{ "bool": { "filter": [{ "term": { "tags": "x" } }] } }"#;
        let result = QueryParser::parse_str(json);
        assert!(matches!(result, Err(QueryDslError::InvalidRequest(_))));
    }
}
