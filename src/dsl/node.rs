//! Clause tree model
//!
//! A DSL document is a [`Query`]: three ordered lists of [`Node`]s combined as
//! `all` (AND), `any` (OR, at least one) and `none` (NOT). Each node is either a
//! nested compound query or a leaf [`Clause`] naming a registered clause type.
//!
//! ```json
//! {
//!   "all": [{ "type": "path", "args": { "prefix": "/home/x" } }],
//!   "any": [{ "type": "owner", "args": { "owner": "alice" } }],
//!   "none": []
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Loosely-typed clause arguments, decoded by each clause processor
pub type ClauseArgs = Map<String, Value>;

/// A compound query: the top-level document, or a nested grouping
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Every node must match
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub all: Vec<Node>,
    /// At least one node must match
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub any: Vec<Node>,
    /// No node may match
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub none: Vec<Node>,
}

impl Query {
    /// Create an empty query (matches everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to `all`
    pub fn all(mut self, node: impl Into<Node>) -> Self {
        self.all.push(node.into());
        self
    }

    /// Add a node to `any`
    pub fn any(mut self, node: impl Into<Node>) -> Self {
        self.any.push(node.into());
        self
    }

    /// Add a node to `none`
    pub fn none(mut self, node: impl Into<Node>) -> Self {
        self.none.push(node.into());
        self
    }

    /// Check whether all three lists are empty
    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.any.is_empty() && self.none.is_empty()
    }

    /// Total number of direct children
    pub fn len(&self) -> usize {
        self.all.len() + self.any.len() + self.none.len()
    }

    /// Parse a DSL document from a JSON string
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Treat an explicit `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A leaf clause: a registered clause type plus its arguments
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    #[serde(rename = "type")]
    pub clause_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: ClauseArgs,
}

impl Clause {
    /// Create a clause with no arguments
    pub fn new(clause_type: impl Into<String>) -> Self {
        Self {
            clause_type: clause_type.into(),
            args: ClauseArgs::new(),
        }
    }

    /// Add an argument
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }
}

/// One element of a DSL document
///
/// Decoding prefers `Compound` whenever any of `all`/`any`/`none` is non-empty,
/// then `Clause` when `type` is non-empty. Anything else decodes as `Malformed`,
/// which fails translation and renders as a diagnostic in summaries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub enum Node {
    Compound(Query),
    Clause(Clause),
    Malformed(ClauseArgs),
}

impl Node {
    /// Short description used in structural errors and summaries
    pub fn describe(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

impl From<Query> for Node {
    fn from(query: Query) -> Self {
        Node::Compound(query)
    }
}

impl From<Clause> for Node {
    fn from(clause: Clause) -> Self {
        Node::Clause(clause)
    }
}

/// Wire shape shared by compound and leaf nodes
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct RawNode {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    all: Vec<Node>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    any: Vec<Node>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    none: Vec<Node>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    clause_type: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Map::is_empty"
    )]
    args: ClauseArgs,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let query = Query {
            all: raw.all,
            any: raw.any,
            none: raw.none,
        };

        if !query.is_empty() {
            if !raw.clause_type.is_empty() {
                warn!(
                    clause_type = %raw.clause_type,
                    "node has both child queries and a clause type; ignoring the clause"
                );
            }
            return Node::Compound(query);
        }

        if !raw.clause_type.is_empty() {
            return Node::Clause(Clause {
                clause_type: raw.clause_type,
                args: raw.args,
            });
        }

        Node::Malformed(raw.args)
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        match node {
            Node::Compound(query) => RawNode {
                all: query.all,
                any: query.any,
                none: query.none,
                ..Default::default()
            },
            Node::Clause(clause) => RawNode {
                clause_type: clause.clause_type,
                args: clause.args,
                ..Default::default()
            },
            Node::Malformed(args) => RawNode {
                args,
                ..Default::default()
            },
        }
    }
}
