//! `owner` clause: objects a user owns

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::clause::permissions::{Permission, PERMISSIONS_PATH, PERMISSION_FIELD, USER_FIELD};
use crate::clause::utils::{add_implicit_username_wildcard, decode_args};
use crate::dsl::{ClauseArgs, ClauseDocumentation, ClauseRegistry};
use crate::error::{QueryDslError, Result};
use crate::query::{BackendQuery, BoolQuery, NestedQuery, TermQuery, WildcardQuery};

pub const TYPE_KEY: &str = "owner";

#[derive(Debug, Deserialize)]
struct OwnerArgs {
    #[serde(default)]
    owner: String,
}

fn decode(cancel: &CancellationToken, args: &ClauseArgs) -> Result<OwnerArgs> {
    let decoded: OwnerArgs = decode_args(cancel, args)?;
    if decoded.owner.is_empty() {
        return Err(QueryDslError::InvalidRequest(
            "no owner was passed, cannot create clause".to_string(),
        ));
    }
    Ok(decoded)
}

pub fn documentation() -> ClauseDocumentation {
    ClauseDocumentation::new("Searches for objects owned by a given user").arg(
        "owner",
        "string",
        "The owner to search for, either bare (any zone) or qualified as user#zone",
    )
}

pub fn process(cancel: &CancellationToken, args: &ClauseArgs) -> Result<BackendQuery> {
    let args = decode(cancel, args)?;
    let owned = BoolQuery::new()
        .must(TermQuery::new(PERMISSION_FIELD, Permission::Own.as_str()))
        .must(WildcardQuery::new(
            USER_FIELD,
            add_implicit_username_wildcard(&args.owner),
        ));
    Ok(Box::new(NestedQuery::new(PERMISSIONS_PATH, owned)))
}

pub fn summarize(cancel: &CancellationToken, args: &ClauseArgs) -> Result<String> {
    let args = decode(cancel, args)?;
    Ok(format!("owner=\"{}\"", args.owner))
}

pub fn register(registry: &mut ClauseRegistry) {
    registry.register_summarized(TYPE_KEY, process, documentation(), summarize);
}
