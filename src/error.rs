use thiserror::Error;

/// Main error type for query DSL compilation
#[derive(Error, Debug)]
pub enum QueryDslError {
    #[error("Malformed node: {0}")]
    MalformedNode(String),

    #[error("No processor registered for clause type {0:?}")]
    UnknownClauseType(String),

    #[error("Invalid clause arguments: {0}")]
    InvalidArguments(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Clause {clause_type:?} failed: {source}")]
    Clause {
        clause_type: String,
        #[source]
        source: Box<QueryDslError>,
    },

    #[error("Translation cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for query DSL operations
pub type Result<T> = std::result::Result<T, QueryDslError>;

impl QueryDslError {
    /// Wrap a processor error with the clause type that produced it
    pub fn in_clause(clause_type: impl Into<String>, source: QueryDslError) -> Self {
        QueryDslError::Clause {
            clause_type: clause_type.into(),
            source: Box::new(source),
        }
    }

    /// Check if this error was caused by the submitted document rather than the compiler
    pub fn is_client_error(&self) -> bool {
        match self {
            QueryDslError::MalformedNode(_)
            | QueryDslError::UnknownClauseType(_)
            | QueryDslError::InvalidArguments(_)
            | QueryDslError::InvalidRequest(_)
            | QueryDslError::Serialization(_) => true,
            QueryDslError::Clause { source, .. } => source.is_client_error(),
            QueryDslError::Cancelled | QueryDslError::Internal(_) => false,
        }
    }

    /// The clause type this error is attributed to, if any
    pub fn clause_type(&self) -> Option<&str> {
        match self {
            QueryDslError::Clause { clause_type, .. } => Some(clause_type),
            QueryDslError::UnknownClauseType(clause_type) => Some(clause_type),
            _ => None,
        }
    }
}
