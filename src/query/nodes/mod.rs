//! Concrete query node implementations
//!
//! This module provides implementations of the `QueryNode` trait for
//! the backend query types the clause processors build on.

mod bool_query;
mod nested_query;
mod prefix_query;
mod query_string_query;
mod range_query;
mod term_query;
mod terms_query;
mod wildcard_query;

pub use bool_query::BoolQuery;
pub use nested_query::NestedQuery;
pub use prefix_query::PrefixQuery;
pub use query_string_query::QueryStringQuery;
pub use range_query::RangeQuery;
pub use term_query::TermQuery;
pub use terms_query::TermsQuery;
pub use wildcard_query::WildcardQuery;
