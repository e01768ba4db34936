//! `tag` clause: objects carrying any of a set of tag IDs

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::clause::utils::decode_args;
use crate::dsl::{ClauseArgs, ClauseDocumentation, ClauseRegistry};
use crate::error::{QueryDslError, Result};
use crate::query::{BackendQuery, TermsQuery};

pub const TYPE_KEY: &str = "tag";

const TAGS_FIELD: &str = "tags";

#[derive(Debug, Deserialize)]
struct TagArgs {
    #[serde(default)]
    tags: Vec<String>,
}

fn decode(cancel: &CancellationToken, args: &ClauseArgs) -> Result<TagArgs> {
    let decoded: TagArgs = decode_args(cancel, args)?;
    if decoded.tags.is_empty() {
        return Err(QueryDslError::InvalidRequest(
            "no tags were passed, cannot create clause".to_string(),
        ));
    }
    Ok(decoded)
}

pub fn documentation() -> ClauseDocumentation {
    ClauseDocumentation::new("Searches for objects tagged with any of a list of tags")
        .arg("tags", "[]string", "The tag IDs to search for")
}

pub fn process(cancel: &CancellationToken, args: &ClauseArgs) -> Result<BackendQuery> {
    let args = decode(cancel, args)?;
    Ok(Box::new(TermsQuery::new(TAGS_FIELD, args.tags)))
}

pub fn summarize(cancel: &CancellationToken, args: &ClauseArgs) -> Result<String> {
    let args = decode(cancel, args)?;
    Ok(format!("tags=[{}]", args.tags.join(",")))
}

pub fn register(registry: &mut ClauseRegistry) {
    registry.register_summarized(TYPE_KEY, process, documentation(), summarize);
}
