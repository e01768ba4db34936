//! `path` clause: objects under a path prefix

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::clause::utils::decode_args;
use crate::dsl::{ClauseArgs, ClauseDocumentation, ClauseRegistry};
use crate::error::{QueryDslError, Result};
use crate::query::{BackendQuery, PrefixQuery};

pub const TYPE_KEY: &str = "path";

#[derive(Debug, Deserialize)]
struct PathArgs {
    #[serde(default)]
    prefix: String,
}

fn decode(cancel: &CancellationToken, args: &ClauseArgs) -> Result<PathArgs> {
    let decoded: PathArgs = decode_args(cancel, args)?;
    if decoded.prefix.is_empty() {
        return Err(QueryDslError::InvalidRequest(
            "no prefix was passed, cannot create clause".to_string(),
        ));
    }
    Ok(decoded)
}

pub fn documentation() -> ClauseDocumentation {
    ClauseDocumentation::new("Searches for objects whose path starts with a given prefix")
        .arg("prefix", "string", "The path prefix to search for")
}

pub fn process(cancel: &CancellationToken, args: &ClauseArgs) -> Result<BackendQuery> {
    let args = decode(cancel, args)?;
    Ok(Box::new(PrefixQuery::new("path", args.prefix)))
}

pub fn summarize(cancel: &CancellationToken, args: &ClauseArgs) -> Result<String> {
    let args = decode(cancel, args)?;
    Ok(format!("path=\"{}\"", args.prefix))
}

pub fn register(registry: &mut ClauseRegistry) {
    registry.register_summarized(TYPE_KEY, process, documentation(), summarize);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_processor() {
        let cancel = CancellationToken::new();
        let args = json!({ "prefix": "/iplant/home/foo" }).as_object().cloned().unwrap();

        let query = process(&cancel, &args).unwrap();
        assert_eq!(query.source(), json!({ "prefix": { "path": "/iplant/home/foo" } }));
        assert_eq!(summarize(&cancel, &args).unwrap(), "path=\"/iplant/home/foo\"");
    }

    #[test]
    fn test_path_errors() {
        let cancel = CancellationToken::new();
        assert!(process(&cancel, &ClauseArgs::new()).is_err());

        let bad = json!({ "prefix": 444 }).as_object().cloned().unwrap();
        assert!(process(&cancel, &bad).is_err());
    }
}
