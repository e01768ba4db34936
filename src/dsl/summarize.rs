//! Summarization engine
//!
//! Renders a clause tree as a short human-readable line such as
//! `All:[path="/a",label~"x"] None:[{clause:owner}]`. Children are visited in
//! list order, one at a time, so output is deterministic. Summarization never
//! fails: unknown clause types, summarizer errors and malformed nodes are
//! rendered inline.

use tokio_util::sync::CancellationToken;

use crate::dsl::node::{Clause, Node, Query};
use crate::dsl::registry::ClauseRegistry;

/// Summarize a compound query
pub(crate) fn summarize_query(
    registry: &ClauseRegistry,
    query: &Query,
    cancel: &CancellationToken,
) -> String {
    let sections = [("All", &query.all), ("Any", &query.any), ("None", &query.none)];

    let rendered: Vec<String> = sections
        .iter()
        .filter(|(_, nodes)| !nodes.is_empty())
        .map(|(label, nodes)| {
            let children: Vec<String> = nodes
                .iter()
                .map(|node| summarize_node(registry, node, cancel))
                .collect();
            format!("{}:[{}]", label, children.join(","))
        })
        .collect();

    rendered.join(" ").trim().to_string()
}

/// Summarize any node
pub(crate) fn summarize_node(
    registry: &ClauseRegistry,
    node: &Node,
    cancel: &CancellationToken,
) -> String {
    match node {
        Node::Compound(query) => summarize_query(registry, query, cancel),
        Node::Clause(clause) => summarize_clause(registry, clause, cancel),
        Node::Malformed(_) => format!(
            "node {} is neither a properly-formatted query nor a clause",
            node.describe()
        ),
    }
}

fn summarize_clause(registry: &ClauseRegistry, clause: &Clause, cancel: &CancellationToken) -> String {
    match registry.summarizer(&clause.clause_type) {
        Some(summarizer) => match summarizer.summarize(cancel, &clause.args) {
            Ok(summary) => summary,
            Err(err) => format!("{{ERR:{}}}", err),
        },
        None => format!("{{clause:{}}}", clause.clause_type),
    }
}
