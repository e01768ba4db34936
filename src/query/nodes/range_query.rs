//! Range query - matches documents with field values in a range

use crate::query::ast::{with_boost, wrap, QueryNode};
use crate::query::types::{RangeBounds, RangeValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Query that matches documents with field values within a specified range
///
/// Works with numeric fields (Long, Double) and date fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RangeQuery {
    /// Field to search in
    pub field: String,
    /// Range bounds (gte, gt, lte, lt)
    #[serde(flatten)]
    pub bounds: RangeBounds,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_boost() -> f32 {
    1.0
}

impl RangeQuery {
    /// Create a new range query
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            bounds: RangeBounds::default(),
            boost: 1.0,
        }
    }

    /// Set the greater-than-or-equal bound
    pub fn gte(mut self, value: impl Into<RangeValue>) -> Self {
        self.bounds.gte = Some(value.into());
        self
    }

    /// Set the greater-than bound
    pub fn gt(mut self, value: impl Into<RangeValue>) -> Self {
        self.bounds.gt = Some(value.into());
        self
    }

    /// Set the less-than-or-equal bound
    pub fn lte(mut self, value: impl Into<RangeValue>) -> Self {
        self.bounds.lte = Some(value.into());
        self
    }

    /// Set the less-than bound
    pub fn lt(mut self, value: impl Into<RangeValue>) -> Self {
        self.bounds.lt = Some(value.into());
        self
    }

    /// Set the bounds from a RangeBounds struct
    pub fn with_bounds(mut self, bounds: RangeBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl QueryNode for RangeQuery {
    fn source(&self) -> Value {
        let spec = with_boost(self.bounds.to_json(), self.boost);
        let mut body = Map::new();
        body.insert(self.field.clone(), Value::Object(spec));
        wrap("range", body)
    }

    fn query_type(&self) -> &'static str {
        "range"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
