//! Clause registry
//!
//! Maps clause type identifiers to the processor that compiles them, their
//! documentation and an optional summarizer. The registry is populated once at
//! startup and handed to [`QueryDsl`](crate::dsl::QueryDsl), which never mutates it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::dsl::node::ClauseArgs;
use crate::error::Result;
use crate::query::BackendQuery;

/// Compiles one clause's arguments into a backend query
pub trait ClauseProcessor: Send + Sync {
    fn process(&self, cancel: &CancellationToken, args: &ClauseArgs) -> Result<BackendQuery>;
}

impl<F> ClauseProcessor for F
where
    F: Fn(&CancellationToken, &ClauseArgs) -> Result<BackendQuery> + Send + Sync,
{
    fn process(&self, cancel: &CancellationToken, args: &ClauseArgs) -> Result<BackendQuery> {
        self(cancel, args)
    }
}

/// Renders one clause's arguments as human-readable text
pub trait ClauseSummarizer: Send + Sync {
    fn summarize(&self, cancel: &CancellationToken, args: &ClauseArgs) -> Result<String>;
}

impl<F> ClauseSummarizer for F
where
    F: Fn(&CancellationToken, &ClauseArgs) -> Result<String> + Send + Sync,
{
    fn summarize(&self, cancel: &CancellationToken, args: &ClauseArgs) -> Result<String> {
        self(cancel, args)
    }
}

/// Help text for a single clause argument
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDocumentation {
    #[serde(rename = "type")]
    pub arg_type: String,
    pub summary: String,
}

impl ArgumentDocumentation {
    pub fn new(arg_type: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            arg_type: arg_type.into(),
            summary: summary.into(),
        }
    }
}

/// Help text for a clause type
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseDocumentation {
    pub summary: String,
    pub args: BTreeMap<String, ArgumentDocumentation>,
}

impl ClauseDocumentation {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            args: BTreeMap::new(),
        }
    }

    /// Document an argument
    pub fn arg(
        mut self,
        name: impl Into<String>,
        arg_type: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        self.args
            .insert(name.into(), ArgumentDocumentation::new(arg_type, summary));
        self
    }
}

struct ClauseEntry {
    processor: Arc<dyn ClauseProcessor>,
    documentation: ClauseDocumentation,
    summarizer: Option<Arc<dyn ClauseSummarizer>>,
}

/// Registry of clause types known to a compiler instance
#[derive(Default)]
pub struct ClauseRegistry {
    entries: HashMap<String, ClauseEntry>,
}

impl ClauseRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clause type without a summarizer
    ///
    /// Registering an existing type replaces the previous entry.
    pub fn register(
        &mut self,
        clause_type: impl Into<String>,
        processor: impl ClauseProcessor + 'static,
        documentation: ClauseDocumentation,
    ) {
        self.insert(clause_type.into(), Arc::new(processor), documentation, None);
    }

    /// Register a clause type with a summarizer
    pub fn register_summarized(
        &mut self,
        clause_type: impl Into<String>,
        processor: impl ClauseProcessor + 'static,
        documentation: ClauseDocumentation,
        summarizer: impl ClauseSummarizer + 'static,
    ) {
        self.insert(
            clause_type.into(),
            Arc::new(processor),
            documentation,
            Some(Arc::new(summarizer)),
        );
    }

    fn insert(
        &mut self,
        clause_type: String,
        processor: Arc<dyn ClauseProcessor>,
        documentation: ClauseDocumentation,
        summarizer: Option<Arc<dyn ClauseSummarizer>>,
    ) {
        debug!(clause_type = %clause_type, summarized = summarizer.is_some(), "registering clause type");
        self.entries.insert(
            clause_type,
            ClauseEntry {
                processor,
                documentation,
                summarizer,
            },
        );
    }

    /// Look up the processor for a clause type
    pub fn processor(&self, clause_type: &str) -> Option<Arc<dyn ClauseProcessor>> {
        self.entries
            .get(clause_type)
            .map(|entry| Arc::clone(&entry.processor))
    }

    /// Look up the summarizer for a clause type
    pub fn summarizer(&self, clause_type: &str) -> Option<Arc<dyn ClauseSummarizer>> {
        self.entries
            .get(clause_type)
            .and_then(|entry| entry.summarizer.clone())
    }

    /// Documentation for every registered clause type, keyed by type
    pub fn documentation(&self) -> BTreeMap<String, ClauseDocumentation> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.documentation.clone()))
            .collect()
    }

    /// Every registered summarizer, keyed by clause type
    pub fn summarizers(&self) -> BTreeMap<String, Arc<dyn ClauseSummarizer>> {
        self.entries
            .iter()
            .filter_map(|(name, entry)| {
                entry
                    .summarizer
                    .as_ref()
                    .map(|summarizer| (name.clone(), Arc::clone(summarizer)))
            })
            .collect()
    }

    pub fn contains(&self, clause_type: &str) -> bool {
        self.entries.contains_key(clause_type)
    }

    /// Registered clause types, sorted
    pub fn clause_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.entries.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ClauseRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClauseRegistry")
            .field("clause_types", &self.clause_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{MatchAllQuery, TermQuery};
    use serde_json::json;

    fn match_all(_: &CancellationToken, _: &ClauseArgs) -> Result<BackendQuery> {
        Ok(Box::new(MatchAllQuery::new()))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ClauseRegistry::new();
        assert!(registry.is_empty());

        registry.register("all", match_all, ClauseDocumentation::new("Matches everything"));

        assert!(registry.contains("all"));
        assert_eq!(registry.len(), 1);
        assert!(registry.processor("missing").is_none());
        assert!(registry.summarizer("all").is_none());

        let processor = registry.processor("all").unwrap();
        let query = processor
            .process(&CancellationToken::new(), &ClauseArgs::new())
            .unwrap();
        assert_eq!(query.source(), json!({ "match_all": {} }));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = ClauseRegistry::new();
        registry.register("x", match_all, ClauseDocumentation::new("first"));
        registry.register_summarized(
            "x",
            |_: &CancellationToken, _: &ClauseArgs| -> Result<BackendQuery> {
                Ok(Box::new(TermQuery::new("f", "v")))
            },
            ClauseDocumentation::new("second"),
            |_: &CancellationToken, _: &ClauseArgs| -> Result<String> { Ok("x!".to_string()) },
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.documentation()["x"].summary, "second");

        let cancel = CancellationToken::new();
        let query = registry
            .processor("x")
            .unwrap()
            .process(&cancel, &ClauseArgs::new())
            .unwrap();
        assert_eq!(query.query_type(), "term");
        assert_eq!(
            registry
                .summarizer("x")
                .unwrap()
                .summarize(&cancel, &ClauseArgs::new())
                .unwrap(),
            "x!"
        );
    }

    #[test]
    fn test_documentation_and_summarizers() {
        let mut registry = ClauseRegistry::new();
        registry.register(
            "b",
            match_all,
            ClauseDocumentation::new("B").arg("name", "string", "A name"),
        );
        registry.register_summarized(
            "a",
            match_all,
            ClauseDocumentation::new("A"),
            |_: &CancellationToken, _: &ClauseArgs| -> Result<String> { Ok("a".to_string()) },
        );

        assert_eq!(registry.clause_types(), vec!["a", "b"]);
        assert_eq!(
            registry.summarizers().keys().collect::<Vec<_>>(),
            vec!["a"]
        );

        let docs = serde_json::to_value(registry.documentation()).unwrap();
        assert_eq!(
            docs["b"],
            json!({
                "summary": "B",
                "args": { "name": { "type": "string", "summary": "A name" } }
            })
        );
    }
}
