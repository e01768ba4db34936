//! `label` clause: search on an object's label, typically its file name

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::clause::utils::{add_implicit_wildcard, decode_args};
use crate::dsl::{ClauseArgs, ClauseDocumentation, ClauseRegistry};
use crate::error::{QueryDslError, Result};
use crate::query::{BackendQuery, QueryStringQuery};

pub const TYPE_KEY: &str = "label";

const LABEL_FIELD: &str = "label";

#[derive(Debug, Deserialize)]
struct LabelArgs {
    #[serde(default)]
    label: String,
    #[serde(default)]
    exact: bool,
}

impl LabelArgs {
    fn decode(cancel: &CancellationToken, args: &ClauseArgs) -> Result<Self> {
        let decoded: LabelArgs = decode_args(cancel, args)?;
        if decoded.label.is_empty() {
            return Err(QueryDslError::InvalidRequest(
                "no label was passed, cannot create clause".to_string(),
            ));
        }
        Ok(decoded)
    }
}

pub fn documentation() -> ClauseDocumentation {
    ClauseDocumentation::new("Searches based on an object's label (typically, its filename)")
        .arg("label", "string", "The label to search for")
        .arg(
            "exact",
            "bool",
            "Whether to search more precisely, or whether the query should be processed to add wildcards",
        )
}

pub fn process(cancel: &CancellationToken, args: &ClauseArgs) -> Result<BackendQuery> {
    let args = LabelArgs::decode(cancel, args)?;
    let text = if args.exact {
        args.label
    } else {
        add_implicit_wildcard(&args.label)
    };
    Ok(Box::new(QueryStringQuery::new(text).field(LABEL_FIELD)))
}

pub fn summarize(cancel: &CancellationToken, args: &ClauseArgs) -> Result<String> {
    let args = LabelArgs::decode(cancel, args)?;
    let op = if args.exact { '=' } else { '~' };
    Ok(format!("label{}\"{}\"", op, args.label))
}

pub fn register(registry: &mut ClauseRegistry) {
    registry.register_summarized(TYPE_KEY, process, documentation(), summarize);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn args(value: Value) -> ClauseArgs {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_label_processor() {
        let cancel = CancellationToken::new();
        let cases = [
            (json!({ "label": "foo" }), "*foo*"),
            (json!({ "label": "foo bar" }), "*foo* *bar*"),
            (json!({ "label": "foo bar", "exact": true }), "foo bar"),
            (json!({ "label": "fo?" }), "fo?"),
        ];
        for (input, expected) in cases {
            let query = process(&cancel, &args(input)).unwrap();
            assert_eq!(
                query.source(),
                json!({ "query_string": { "query": expected, "fields": ["label"] } })
            );
        }
    }

    #[test]
    fn test_label_errors() {
        let cancel = CancellationToken::new();
        assert!(process(&cancel, &args(json!({}))).is_err());
        assert!(process(&cancel, &args(json!({ "label": 444 }))).is_err());
        assert!(summarize(&cancel, &args(json!({ "label": "" }))).is_err());
    }

    #[test]
    fn test_label_summary() {
        let cancel = CancellationToken::new();
        assert_eq!(
            summarize(&cancel, &args(json!({ "label": "foo" }))).unwrap(),
            "label~\"foo\""
        );
        assert_eq!(
            summarize(&cancel, &args(json!({ "label": "foo", "exact": true }))).unwrap(),
            "label=\"foo\""
        );
    }
}
