//! Helpers shared by clause processors

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::dsl::ClauseArgs;
use crate::error::{QueryDslError, Result};
use crate::query::{RangeQuery, RangeValue};

/// Separates a user name from its zone (`alice#iplant`)
pub const USER_DELIMITER: char = '#';

static FILESIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(KB|MB|GB|TB)?$").expect("filesize pattern is valid")
});

/// Decode clause arguments into a typed struct
///
/// Checks the cancellation token first, so a cancelled translation stops at the
/// next clause instead of building queries nobody will read.
pub fn decode_args<T: DeserializeOwned>(cancel: &CancellationToken, args: &ClauseArgs) -> Result<T> {
    if cancel.is_cancelled() {
        return Err(QueryDslError::Cancelled);
    }
    serde_json::from_value(Value::Object(args.clone()))
        .map_err(|err| QueryDslError::InvalidArguments(err.to_string()))
}

/// Turn plain words into `*word*` wildcards for a query string query
///
/// Bare `OR` tokens are dropped since whitespace already means OR. Text that
/// already uses query string syntax (`"`, `*`, `?` or `\`) is left alone.
pub fn add_implicit_wildcard(text: &str) -> String {
    if text.contains(['"', '*', '?', '\\']) {
        return text.to_string();
    }

    text.split_whitespace()
        .filter(|word| *word != "OR")
        .map(|word| format!("*{}*", word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Match a bare user name in any zone
pub fn add_implicit_username_wildcard(user: &str) -> String {
    if user.contains(USER_DELIMITER) {
        user.to_string()
    } else {
        format!("{}{}*", user, USER_DELIMITER)
    }
}

/// Inclusive range over `field`, or `None` when both bounds are missing
pub fn range_query(
    field: &str,
    from: Option<impl Into<RangeValue>>,
    to: Option<impl Into<RangeValue>>,
) -> Option<RangeQuery> {
    if from.is_none() && to.is_none() {
        return None;
    }

    let mut query = RangeQuery::new(field);
    if let Some(from) = from {
        query = query.gte(from);
    }
    if let Some(to) = to {
        query = query.lte(to);
    }
    Some(query)
}

/// Parse a human file size such as `10`, `1.5 MB` or `2tb` into bytes
///
/// Units are powers of 1024.
pub fn string_to_filesize(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    let captures = FILESIZE_PATTERN.captures(trimmed).ok_or_else(|| {
        QueryDslError::InvalidArguments(format!("{:?} is not a valid file size", text))
    })?;

    let number: f64 = captures[1]
        .parse()
        .map_err(|_| QueryDslError::InvalidArguments(format!("{:?} is not a valid file size", text)))?;

    let multiplier: f64 = match captures.get(2).map(|unit| unit.as_str().to_ascii_uppercase()) {
        None => 1.0,
        Some(unit) => match unit.as_str() {
            "KB" => 1024.0,
            "MB" => 1024.0_f64.powi(2),
            "GB" => 1024.0_f64.powi(3),
            "TB" => 1024.0_f64.powi(4),
            other => {
                return Err(QueryDslError::InvalidArguments(format!(
                    "unknown file size unit {:?}",
                    other
                )))
            }
        },
    };

    let bytes = number * multiplier;
    // i64::MAX rounds up to 2^63 as f64, which itself does not fit
    if !bytes.is_finite() || bytes >= i64::MAX as f64 {
        return Err(QueryDslError::InvalidArguments(format!(
            "{:?} is too large a file size",
            text
        )));
    }
    Ok(bytes as i64)
}
