pub mod clause;
pub mod config;
pub mod dsl;
pub mod error;
pub mod query;

pub use config::CompilerConfig;
pub use dsl::{Clause, ClauseArgs, ClauseDocumentation, ClauseRegistry, Node, Query, QueryDsl};
pub use error::{QueryDslError, Result};
pub use query::{BackendQuery, QueryNode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
