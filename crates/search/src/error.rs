use codeintel_graph::GraphError;
use codeintel_indexer::IndexerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("No solution is loaded. Call load_solution with a .sln, .slnx, .csproj or directory path first.")]
    NotLoaded,

    #[error("{what} '{id}' not found. {hint}")]
    NotFound {
        what: String,
        id: String,
        hint: String,
    },

    #[error("{operation} needs a live semantic engine, which the current provider does not offer")]
    Unavailable { operation: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Analysis failed: {0}")]
    Analysis(IndexerError),

    #[error("Semantic engine error: {0}")]
    Engine(String),
}

impl QueryError {
    pub fn not_found(what: &str, id: &str, hint: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.to_string(),
            id: id.to_string(),
            hint: hint.into(),
        }
    }

    pub fn unavailable(operation: &str) -> Self {
        Self::Unavailable {
            operation: operation.to_string(),
        }
    }

    /// Stable error code reported to tool callers.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotLoaded => "not_loaded",
            Self::NotFound { .. } => "not_found",
            Self::Unavailable { .. } => "unavailable",
            Self::InvalidArgument(_) => "invalid_request",
            Self::Cancelled => "cancelled",
            Self::Analysis(_) | Self::Engine(_) => "internal",
        }
    }

    /// Engine failures other than cancellation.
    pub(crate) fn from_engine(err: IndexerError) -> Self {
        if err.is_cancelled() {
            Self::Cancelled
        } else {
            Self::Engine(err.to_string())
        }
    }
}

impl From<IndexerError> for QueryError {
    fn from(err: IndexerError) -> Self {
        match err {
            IndexerError::Cancelled => Self::Cancelled,
            IndexerError::InvalidPath(path) => Self::InvalidArgument(format!("invalid path: {path}")),
            other => Self::Analysis(other),
        }
    }
}

impl From<GraphError> for QueryError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::ProjectNotFound(name) => {
                Self::not_found("Project", &name, "Use get_solution_info to list projects.")
            }
        }
    }
}
