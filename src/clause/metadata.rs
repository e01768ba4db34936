//! `metadata` clause: search attribute/value/unit triples attached to objects
//!
//! Objects carry two nested metadata collections, `metadata.irods` and
//! `metadata.cyverse`. The clause searches either or both of them; each
//! collection must contain one entry matching every non-empty part.

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::clause::utils::{add_implicit_wildcard, decode_args};
use crate::dsl::{ClauseArgs, ClauseDocumentation, ClauseRegistry};
use crate::error::{QueryDslError, Result};
use crate::query::{BackendQuery, BoolQuery, NestedQuery, QueryStringQuery};

pub const TYPE_KEY: &str = "metadata";

const METADATA_TYPES: [&str; 2] = ["irods", "cyverse"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetadataArgs {
    attribute: String,
    value: String,
    unit: String,
    metadata_types: Vec<String>,
    attribute_exact: bool,
    value_exact: bool,
    unit_exact: bool,
}

impl MetadataArgs {
    fn decode(cancel: &CancellationToken, args: &ClauseArgs) -> Result<Self> {
        let decoded: MetadataArgs = decode_args(cancel, args)?;
        if decoded.attribute.is_empty() && decoded.value.is_empty() && decoded.unit.is_empty() {
            return Err(QueryDslError::InvalidRequest(
                "must provide at least one of attribute, value, or unit".to_string(),
            ));
        }
        Ok(decoded)
    }

    /// Collections to search, in canonical order
    fn collections(&self) -> Result<Vec<&'static str>> {
        if self.metadata_types.is_empty() {
            return Ok(METADATA_TYPES.to_vec());
        }

        for requested in &self.metadata_types {
            if !METADATA_TYPES.contains(&requested.as_str()) {
                return Err(QueryDslError::InvalidRequest(format!(
                    "got a metadata type of {:?}, but expected irods or cyverse",
                    requested
                )));
            }
        }

        Ok(METADATA_TYPES
            .iter()
            .copied()
            .filter(|known| self.metadata_types.iter().any(|requested| requested == known))
            .collect())
    }

    /// (part name, query text) for every non-empty part
    fn parts(&self) -> Vec<(&'static str, String)> {
        [
            ("attribute", &self.attribute, self.attribute_exact),
            ("value", &self.value, self.value_exact),
            ("unit", &self.unit, self.unit_exact),
        ]
        .into_iter()
        .filter(|(_, text, _)| !text.is_empty())
        .map(|(name, text, exact)| {
            let query = if exact {
                text.clone()
            } else {
                add_implicit_wildcard(text)
            };
            (name, query)
        })
        .collect()
    }
}

fn nested_collection(collection: &str, parts: &[(&'static str, String)]) -> NestedQuery {
    let path = format!("metadata.{}", collection);
    let inner = parts.iter().fold(BoolQuery::new(), |query, (name, text)| {
        query.must(QueryStringQuery::new(text.clone()).field(format!("{}.{}", path, name)))
    });
    NestedQuery::new(path, inner)
}

pub fn documentation() -> ClauseDocumentation {
    ClauseDocumentation::new(
        "Searches based on the metadata associated with an object. At least one of attribute, value, or unit should be non-blank.",
    )
    .arg("attribute", "string", "The AVU's attribute field")
    .arg("value", "string", "The AVU's value field")
    .arg("unit", "string", "The AVU's unit field")
    .arg(
        "metadata_types",
        "[]string",
        "What types of metadata to search. Can include 'irods', 'cyverse', or blank for both types.",
    )
    .arg("attribute_exact", "bool", "Whether to search the attribute exactly, or add implicit wildcards")
    .arg("value_exact", "bool", "Whether to search the value exactly, or add implicit wildcards")
    .arg("unit_exact", "bool", "Whether to search the unit exactly, or add implicit wildcards")
}

pub fn process(cancel: &CancellationToken, args: &ClauseArgs) -> Result<BackendQuery> {
    let args = MetadataArgs::decode(cancel, args)?;
    let parts = args.parts();

    let query = args
        .collections()?
        .into_iter()
        .fold(BoolQuery::new(), |query, collection| {
            query.should(nested_collection(collection, &parts))
        });
    Ok(Box::new(query))
}

pub fn summarize(cancel: &CancellationToken, args: &ClauseArgs) -> Result<String> {
    let args = MetadataArgs::decode(cancel, args)?;

    let part = |label: &str, text: &str, exact: bool| {
        if text.is_empty() {
            String::new()
        } else {
            format!("{}{}\"{}\"", label, if exact { '=' } else { '~' }, text)
        }
    };

    let avu = [
        part("attr", &args.attribute, args.attribute_exact),
        part("value", &args.value, args.value_exact),
        part("unit", &args.unit, args.unit_exact),
    ]
    .join(",");

    Ok(format!("metadata=({})({})", avu, args.metadata_types.join(",")))
}

pub fn register(registry: &mut ClauseRegistry) {
    registry.register_summarized(TYPE_KEY, process, documentation(), summarize);
}
