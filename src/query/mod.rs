//! Backend query primitives
//!
//! This module provides the composable building blocks clause processors emit,
//! rendered as Elasticsearch-compatible query JSON:
//! - Boolean queries (AND, OR, NOT)
//! - Term / terms queries (exact match)
//! - Wildcard, prefix and query string queries
//! - Range queries (numeric/date ranges)
//! - Nested queries (scoped to nested object collections)
//!
//! # Example
//!
//! ```json
//! {
//!   "bool": {
//!     "must": [
//!       { "prefix": { "path": "/iplant/home" } }
//!     ],
//!     "should": [
//!       { "range": { "fileSize": { "gte": 1024 } } }
//!     ],
//!     "minimum_should_match": 1
//!   }
//! }
//! ```

pub mod ast;
pub mod nodes;
pub mod parser;
pub mod types;

pub use ast::{BackendQuery, MatchAllQuery, QueryNode};
pub use nodes::{
    BoolQuery, NestedQuery, PrefixQuery, QueryStringQuery, RangeQuery, TermQuery, TermsQuery,
    WildcardQuery,
};
pub use parser::QueryParser;
pub use types::*;
