//! Core types for the backend query primitives

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Value type for range queries
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeValue {
    /// 64-bit integer
    Long(i64),
    /// 64-bit floating point
    Double(f64),
    /// String (for dates, keywords)
    String(String),
}

impl RangeValue {
    /// Render as a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            RangeValue::Long(v) => json!(v),
            RangeValue::Double(v) => json!(v),
            RangeValue::String(s) => json!(s),
        }
    }

    /// Parse a JSON value into a range value
    pub fn from_json(value: &Value) -> RangeValue {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RangeValue::Long(i)
                } else if let Some(f) = n.as_f64() {
                    RangeValue::Double(f)
                } else {
                    RangeValue::String(n.to_string())
                }
            }
            Value::String(s) => RangeValue::String(s.clone()),
            _ => RangeValue::String(value.to_string()),
        }
    }
}

impl From<i64> for RangeValue {
    fn from(value: i64) -> Self {
        RangeValue::Long(value)
    }
}

impl From<i32> for RangeValue {
    fn from(value: i32) -> Self {
        RangeValue::Long(value as i64)
    }
}

impl From<f64> for RangeValue {
    fn from(value: f64) -> Self {
        RangeValue::Double(value)
    }
}

impl From<&str> for RangeValue {
    fn from(value: &str) -> Self {
        RangeValue::String(value.to_string())
    }
}

/// Range bounds for range queries
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    /// Greater than or equal to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<RangeValue>,
    /// Greater than
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<RangeValue>,
    /// Less than or equal to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<RangeValue>,
    /// Less than
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<RangeValue>,
}

impl RangeBounds {
    /// Render the bounds as a JSON object
    pub fn to_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let bounds = [
            ("gte", &self.gte),
            ("gt", &self.gt),
            ("lte", &self.lte),
            ("lt", &self.lt),
        ];
        for (key, bound) in bounds {
            if let Some(value) = bound {
                map.insert(key.to_string(), value.to_json());
            }
        }
        map
    }
}

/// Minimum should match configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinimumShouldMatch {
    /// Exact count
    Count(usize),
    /// Percentage (e.g., "75%")
    Percentage(String),
}

impl MinimumShouldMatch {
    /// Render as a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            MinimumShouldMatch::Count(n) => json!(n),
            MinimumShouldMatch::Percentage(s) => json!(s),
        }
    }
}

impl Default for MinimumShouldMatch {
    fn default() -> Self {
        MinimumShouldMatch::Count(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_value_conversions() {
        assert_eq!(RangeValue::Long(42).to_json(), json!(42));
        assert_eq!(RangeValue::from("100").to_json(), json!("100"));

        assert_eq!(RangeValue::from_json(&json!(7)), RangeValue::Long(7));
        assert_eq!(RangeValue::from_json(&json!(2.5)), RangeValue::Double(2.5));
        assert_eq!(
            RangeValue::from_json(&json!("2024-01-01")),
            RangeValue::String("2024-01-01".to_string())
        );
    }

    #[test]
    fn test_range_bounds_json() {
        let bounds = RangeBounds {
            gte: Some(RangeValue::Long(10)),
            lte: Some(RangeValue::Long(20)),
            ..Default::default()
        };

        assert_eq!(
            Value::Object(bounds.to_json()),
            json!({ "gte": 10, "lte": 20 })
        );
        assert!(RangeBounds::default().to_json().is_empty());
    }

    #[test]
    fn test_minimum_should_match_json() {
        assert_eq!(MinimumShouldMatch::default().to_json(), json!(1));
        assert_eq!(
            MinimumShouldMatch::Percentage("75%".to_string()).to_json(),
            json!("75%")
        );
    }
}
