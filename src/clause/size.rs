//! `size` clause: files within an inclusive size range

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::clause::utils::{decode_args, range_query, string_to_filesize};
use crate::dsl::{ClauseArgs, ClauseDocumentation, ClauseRegistry};
use crate::error::{QueryDslError, Result};
use crate::query::BackendQuery;

pub const TYPE_KEY: &str = "size";

const SIZE_FIELD: &str = "fileSize";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SizeArgs {
    from: String,
    to: String,
}

fn decode(cancel: &CancellationToken, args: &ClauseArgs) -> Result<SizeArgs> {
    let decoded: SizeArgs = decode_args(cancel, args)?;
    if decoded.from.is_empty() && decoded.to.is_empty() {
        return Err(QueryDslError::InvalidRequest(
            "neither from nor to was passed, cannot create clause".to_string(),
        ));
    }
    Ok(decoded)
}

fn bound(text: &str) -> Result<Option<i64>> {
    if text.is_empty() {
        Ok(None)
    } else {
        string_to_filesize(text).map(Some)
    }
}

pub fn documentation() -> ClauseDocumentation {
    ClauseDocumentation::new(
        "Searches based on an object's file size. Searches matching this clause will only include files, as folders do not store a size.",
    )
    .arg(
        "from",
        "string",
        "The lower end of the range (inclusive). Pass as a string, either a number of bytes or a number followed by optional whitespace and then one of 'KB', 'MB', 'GB', or 'TB', which refer to powers of 1024 bytes.",
    )
    .arg(
        "to",
        "string",
        "The upper end of the range (inclusive). Pass as a string, as with 'from'.",
    )
}

pub fn process(cancel: &CancellationToken, args: &ClauseArgs) -> Result<BackendQuery> {
    let args = decode(cancel, args)?;
    let query = range_query(SIZE_FIELD, bound(&args.from)?, bound(&args.to)?).ok_or_else(|| {
        QueryDslError::InvalidRequest("neither from nor to was passed, cannot create clause".to_string())
    })?;
    Ok(Box::new(query))
}

pub fn summarize(cancel: &CancellationToken, args: &ClauseArgs) -> Result<String> {
    let args = decode(cancel, args)?;
    Ok(format!("size={}--{}", args.from, args.to))
}

pub fn register(registry: &mut ClauseRegistry) {
    registry.register_summarized(TYPE_KEY, process, documentation(), summarize);
}
