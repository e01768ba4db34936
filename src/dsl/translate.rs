//! Translation engine
//!
//! Compiles a clause tree into a backend query. Every child of a compound node
//! runs as its own task in a [`JoinSet`]; the node waits for all of them and folds
//! the results into one [`BoolQuery`]:
//!
//! - `all` results become `must` clauses
//! - `any` results become `should` clauses with `minimum_should_match: 1`
//! - `none` results become `must_not` clauses
//!
//! Result order within a section follows task completion, which is fine because
//! boolean composition is commutative. The first child error fails the node.
//! Leaf processor calls share a [`Semaphore`] so a wide tree cannot run an
//! unbounded number of processors at once. Compound nodes never hold a permit.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::config::CompilerConfig;
use crate::dsl::node::{Clause, Node, Query};
use crate::dsl::registry::ClauseRegistry;
use crate::error::{QueryDslError, Result};
use crate::query::{BackendQuery, BoolQuery, MinimumShouldMatch};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Which list of the parent a child task came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    All,
    Any,
    None,
}

/// Shared state for one compiler instance
#[derive(Clone)]
pub(crate) struct Translator {
    registry: Arc<ClauseRegistry>,
    limiter: Arc<Semaphore>,
    cancel_on_error: bool,
}

impl Translator {
    pub(crate) fn new(registry: Arc<ClauseRegistry>, config: &CompilerConfig) -> Self {
        Self {
            registry,
            limiter: Arc::new(Semaphore::new(config.permits())),
            cancel_on_error: config.cancel_on_error,
        }
    }

    /// Translate a top-level document
    pub(crate) async fn translate_query(
        &self,
        query: Query,
        cancel: &CancellationToken,
    ) -> Result<BackendQuery> {
        let bool_query = self.translate_compound(query, cancel.clone()).await?;
        Ok(Box::new(bool_query))
    }

    /// Translate any node, leaf or compound
    pub(crate) fn translate_node(
        &self,
        node: Node,
        cancel: CancellationToken,
    ) -> BoxFuture<Result<BackendQuery>> {
        let translator = self.clone();
        Box::pin(async move {
            match node {
                Node::Compound(query) => {
                    let bool_query = translator.translate_compound(query, cancel).await?;
                    Ok(Box::new(bool_query) as BackendQuery)
                }
                Node::Clause(clause) => translator.translate_clause(clause, cancel).await,
                Node::Malformed(args) => Err(QueryDslError::MalformedNode(
                    Node::Malformed(args).describe(),
                )),
            }
        })
    }

    async fn translate_clause(
        &self,
        clause: Clause,
        cancel: CancellationToken,
    ) -> Result<BackendQuery> {
        let processor = self
            .registry
            .processor(&clause.clause_type)
            .ok_or_else(|| QueryDslError::UnknownClauseType(clause.clause_type.clone()))?;

        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| QueryDslError::Internal("clause limiter closed".to_string()))?;

        if cancel.is_cancelled() {
            return Err(QueryDslError::Cancelled);
        }

        debug!(clause_type = %clause.clause_type, args = clause.args.len(), "processing clause");
        processor
            .process(&cancel, &clause.args)
            .map_err(|err| QueryDslError::in_clause(clause.clause_type, err))
    }

    async fn translate_compound(&self, query: Query, cancel: CancellationToken) -> Result<BoolQuery> {
        let scope = cancel.child_token();
        let total = query.len();
        let mut tasks = JoinSet::new();

        let sections = [
            (Section::All, query.all),
            (Section::Any, query.any),
            (Section::None, query.none),
        ];
        for (section, nodes) in sections {
            for node in nodes {
                let child = self.translate_node(node, scope.clone());
                tasks.spawn(async move { (section, child.await) });
            }
        }

        let mut bool_query = BoolQuery::new();
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .map_err(|err| QueryDslError::Internal(format!("translation task failed: {}", err)))
                .and_then(|(section, result)| result.map(|query| (section, query)));

            match outcome {
                Ok((section, child)) => {
                    trace!(?section, query_type = child.query_type(), "child translated");
                    bool_query = match section {
                        Section::All => bool_query.must_boxed(child),
                        Section::Any => bool_query.should_boxed(child),
                        Section::None => bool_query.must_not_boxed(child),
                    };
                }
                Err(err) => {
                    let outstanding = tasks.len();
                    warn!(error = %err, outstanding, "child clause failed, abandoning compound query");
                    if self.cancel_on_error {
                        scope.cancel();
                        tasks.abort_all();
                    } else {
                        tasks.detach_all();
                    }
                    return Err(err);
                }
            }
        }

        if !bool_query.should.is_empty() {
            bool_query = bool_query.with_minimum_should_match(MinimumShouldMatch::Count(1));
        }

        debug!(children = total, "compound query translated");
        Ok(bool_query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::node::ClauseArgs;
    use crate::dsl::registry::ClauseDocumentation;
    use crate::query::TermQuery;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn term(_: &CancellationToken, args: &ClauseArgs) -> Result<BackendQuery> {
        let value = args
            .get("value")
            .and_then(Value::as_str)
            .ok_or_else(|| QueryDslError::InvalidArguments("value must be a string".to_string()))?;
        Ok(Box::new(TermQuery::new("field", value)))
    }

    fn fail(_: &CancellationToken, _: &ClauseArgs) -> Result<BackendQuery> {
        Err(QueryDslError::InvalidRequest("always fails".to_string()))
    }

    fn translator(config: CompilerConfig) -> Translator {
        let mut registry = ClauseRegistry::new();
        registry.register("term", term, ClauseDocumentation::new("term"));
        registry.register("fail", fail, ClauseDocumentation::new("fail"));
        registry.register(
            "panic",
            |_: &CancellationToken, _: &ClauseArgs| -> Result<BackendQuery> {
                panic!("processor exploded")
            },
            ClauseDocumentation::new("panic"),
        );
        Translator::new(Arc::new(registry), &config)
    }

    fn term_clause(value: &str) -> Clause {
        Clause::new("term").arg("value", value)
    }

    #[tokio::test]
    async fn test_empty_query_matches_everything() {
        let query = translator(CompilerConfig::default())
            .translate_query(Query::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(query.source(), json!({ "bool": {} }));
    }

    #[tokio::test]
    async fn test_sections_map_to_bool_clauses() {
        let query = Query::new()
            .all(term_clause("a"))
            .any(term_clause("b"))
            .none(term_clause("c"));

        let translated = translator(CompilerConfig::default())
            .translate_query(query, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            translated.source(),
            json!({
                "bool": {
                    "must": [{ "term": { "field": "a" } }],
                    "should": [{ "term": { "field": "b" } }],
                    "must_not": [{ "term": { "field": "c" } }],
                    "minimum_should_match": 1
                }
            })
        );
    }

    #[tokio::test]
    async fn test_nested_compound() {
        let query = Query::new().all(Query::new().any(term_clause("x")).any(term_clause("x")));

        let translated = translator(CompilerConfig::default())
            .translate_query(query, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            translated.source(),
            json!({
                "bool": {
                    "must": [{
                        "bool": {
                            "should": [
                                { "term": { "field": "x" } },
                                { "term": { "field": "x" } }
                            ],
                            "minimum_should_match": 1
                        }
                    }]
                }
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_clause_type() {
        let err = translator(CompilerConfig::default())
            .translate_query(
                Query::new().all(Clause::new("nope")),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, QueryDslError::UnknownClauseType(ref t) if t == "nope"));
    }

    #[tokio::test]
    async fn test_malformed_node_fails() {
        let err = translator(CompilerConfig::default())
            .translate_query(
                Query::new().any(Node::Malformed(ClauseArgs::new())),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, QueryDslError::MalformedNode(_)));
    }

    #[tokio::test]
    async fn test_processor_error_carries_clause_type() {
        let err = translator(CompilerConfig::default())
            .translate_query(
                Query::new().all(Clause::new("term").arg("value", 5)),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.clause_type(), Some("term"));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_failing_child_always_surfaces() {
        for cancel_on_error in [true, false] {
            let translator =
                translator(CompilerConfig::default().with_cancel_on_error(cancel_on_error));
            for _ in 0..25 {
                let mut query = Query::new();
                for i in 0..20 {
                    query = query.all(term_clause(&i.to_string()));
                }
                query = query.none(Query::new().any(Clause::new("fail")));

                let err = translator
                    .translate_query(query, &CancellationToken::new())
                    .await
                    .unwrap_err();
                assert_eq!(err.clause_type(), Some("fail"));
            }
        }
    }

    #[tokio::test]
    async fn test_panicking_processor_is_internal_error() {
        let err = translator(CompilerConfig::default())
            .translate_query(
                Query::new().all(Clause::new("panic")),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, QueryDslError::Internal(_)));
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_translation() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = translator(CompilerConfig::default())
            .translate_query(Query::new().all(term_clause("a")), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryDslError::Cancelled));
    }

    #[tokio::test]
    async fn test_single_permit_with_deep_nesting() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut registry = ClauseRegistry::new();
        registry.register(
            "count",
            move |_: &CancellationToken, _: &ClauseArgs| -> Result<BackendQuery> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(TermQuery::new("f", "v")))
            },
            ClauseDocumentation::new("count"),
        );
        let translator = Translator::new(
            Arc::new(registry),
            &CompilerConfig::default().with_max_concurrent_clauses(1),
        );

        let mut query = Query::new();
        for _ in 0..5 {
            query = Query::new()
                .all(query.all(Clause::new("count")))
                .any(Clause::new("count"));
        }

        translator
            .translate_query(query, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }
}
