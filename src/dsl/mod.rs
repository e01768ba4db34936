//! Clause tree compiler
//!
//! [`QueryDsl`] owns a populated [`ClauseRegistry`] and compiles DSL documents
//! into backend queries, or renders them as summaries.
//!
//! ```no_run
//! use querydsl::QueryDsl;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> querydsl::Result<()> {
//! let dsl = QueryDsl::with_default_clauses();
//! let backend = dsl
//!     .translate_str(
//!         r#"{"all":[{"type":"path","args":{"prefix":"/home/x"}}]}"#,
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//! println!("{}", backend);
//! # Ok(())
//! # }
//! ```

pub mod node;
pub mod registry;
mod summarize;
mod translate;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::CompilerConfig;
use crate::error::Result;
use crate::query::BackendQuery;

pub use node::{Clause, ClauseArgs, Node, Query};
pub use registry::{
    ArgumentDocumentation, ClauseDocumentation, ClauseProcessor, ClauseRegistry,
    ClauseSummarizer,
};

use translate::Translator;

/// Compiler for the `all`/`any`/`none` search DSL
pub struct QueryDsl {
    registry: Arc<ClauseRegistry>,
    config: CompilerConfig,
    translator: Translator,
}

impl QueryDsl {
    /// Create a compiler over a populated registry with the default configuration
    pub fn new(registry: ClauseRegistry) -> Self {
        Self::with_config(registry, CompilerConfig::default())
    }

    /// Create a compiler with an explicit configuration
    pub fn with_config(registry: ClauseRegistry, config: CompilerConfig) -> Self {
        let registry = Arc::new(registry);
        let translator = Translator::new(Arc::clone(&registry), &config);
        debug!(
            clause_types = registry.len(),
            max_concurrent_clauses = config.permits(),
            cancel_on_error = config.cancel_on_error,
            "query compiler ready"
        );
        Self {
            registry,
            config,
            translator,
        }
    }

    /// Create a compiler with every built-in clause type registered
    pub fn with_default_clauses() -> Self {
        Self::with_default_clauses_and_config(CompilerConfig::default())
    }

    /// Create a compiler with every built-in clause type and an explicit configuration
    pub fn with_default_clauses_and_config(config: CompilerConfig) -> Self {
        let mut registry = ClauseRegistry::new();
        crate::clause::register_all(&mut registry);
        Self::with_config(registry, config)
    }

    /// Compile a document into a backend query
    pub async fn translate(&self, query: Query, cancel: &CancellationToken) -> Result<BackendQuery> {
        self.translator.translate_query(query, cancel).await
    }

    /// Compile a single node into a backend query
    pub async fn translate_node(&self, node: Node, cancel: &CancellationToken) -> Result<BackendQuery> {
        self.translator.translate_node(node, cancel.clone()).await
    }

    /// Decode a DSL document from JSON, compile it, and render the backend JSON
    pub async fn translate_str(&self, json: &str, cancel: &CancellationToken) -> Result<Value> {
        let query = Query::from_json_str(json)?;
        Ok(self.translate(query, cancel).await?.source())
    }

    /// Render a document as a human-readable summary
    pub fn summarize(&self, query: &Query, cancel: &CancellationToken) -> String {
        summarize::summarize_query(&self.registry, query, cancel)
    }

    /// Render a single node as a human-readable summary
    pub fn summarize_node(&self, node: &Node, cancel: &CancellationToken) -> String {
        summarize::summarize_node(&self.registry, node, cancel)
    }

    /// Documentation for every registered clause type
    pub fn documentation(&self) -> BTreeMap<String, ClauseDocumentation> {
        self.registry.documentation()
    }

    pub fn registry(&self) -> &ClauseRegistry {
        &self.registry
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }
}

impl std::fmt::Debug for QueryDsl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryDsl")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
