//! `created` and `modified` clauses: objects within an inclusive date range
//!
//! Bounds are RFC 3339 timestamps; the index stores dates as epoch milliseconds.

use chrono::DateTime;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::clause::utils::{decode_args, range_query};
use crate::dsl::{ClauseArgs, ClauseDocumentation, ClauseRegistry};
use crate::error::{QueryDslError, Result};
use crate::query::BackendQuery;

pub const CREATED_TYPE_KEY: &str = "created";
pub const MODIFIED_TYPE_KEY: &str = "modified";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DateArgs {
    from: String,
    to: String,
}

fn decode(cancel: &CancellationToken, args: &ClauseArgs) -> Result<DateArgs> {
    let decoded: DateArgs = decode_args(cancel, args)?;
    if decoded.from.is_empty() && decoded.to.is_empty() {
        return Err(QueryDslError::InvalidRequest(
            "neither from nor to was passed, cannot create clause".to_string(),
        ));
    }
    Ok(decoded)
}

/// Parse an RFC 3339 timestamp into epoch milliseconds
pub fn parse_millis(text: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|date| date.timestamp_millis())
        .map_err(|err| {
            QueryDslError::InvalidArguments(format!("{:?} is not an RFC 3339 date: {}", text, err))
        })
}

fn bound(text: &str) -> Result<Option<i64>> {
    if text.is_empty() {
        Ok(None)
    } else {
        parse_millis(text).map(Some)
    }
}

/// A date range clause over one field
struct DateClause {
    type_key: &'static str,
    field: &'static str,
    noun: &'static str,
}

static CREATED: DateClause = DateClause {
    type_key: CREATED_TYPE_KEY,
    field: "dateCreated",
    noun: "creation",
};

static MODIFIED: DateClause = DateClause {
    type_key: MODIFIED_TYPE_KEY,
    field: "dateModified",
    noun: "last modification",
};

impl DateClause {
    fn documentation(&self) -> ClauseDocumentation {
        ClauseDocumentation::new(format!("Searches based on an object's {} date", self.noun))
            .arg(
                "from",
                "string",
                "The lower end of the range (inclusive), as an RFC 3339 timestamp",
            )
            .arg(
                "to",
                "string",
                "The upper end of the range (inclusive), as an RFC 3339 timestamp",
            )
    }

    fn process(&self, cancel: &CancellationToken, args: &ClauseArgs) -> Result<BackendQuery> {
        let args = decode(cancel, args)?;
        let query = range_query(self.field, bound(&args.from)?, bound(&args.to)?).ok_or_else(|| {
            QueryDslError::InvalidRequest("neither from nor to was passed, cannot create clause".to_string())
        })?;
        Ok(Box::new(query))
    }

    fn summarize(&self, cancel: &CancellationToken, args: &ClauseArgs) -> Result<String> {
        let args = decode(cancel, args)?;
        Ok(format!("{}={}--{}", self.type_key, args.from, args.to))
    }

    fn register(&'static self, registry: &mut ClauseRegistry) {
        registry.register_summarized(
            self.type_key,
            move |cancel: &CancellationToken, args: &ClauseArgs| self.process(cancel, args),
            self.documentation(),
            move |cancel: &CancellationToken, args: &ClauseArgs| self.summarize(cancel, args),
        );
    }
}

pub fn register(registry: &mut ClauseRegistry) {
    CREATED.register(registry);
    MODIFIED.register(registry);
}
