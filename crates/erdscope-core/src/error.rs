use thiserror::Error;

/// User-facing message shown when metadata cannot be turned into a graph.
pub const GRAPH_GENERATION_MESSAGE: &str = "Error occurs when generating E-R graph";
/// User-facing message shown when a search names no known table.
pub const INVALID_SEARCH_CRITERIA_MESSAGE: &str =
    "Invalid search criteria. Please enter valid search criteria.";
/// User-facing message shown when metadata could not be retrieved.
pub const DATABASE_RETRIEVAL_MESSAGE: &str =
    "Error occurred when retrieving database table metadata!";

/// Broad classification of a [`GraphError`], so callers can branch without
/// matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input metadata is malformed. Not retried.
    Structural,
    /// The caller asked for something the graph does not contain.
    NotFound,
    /// An index computed during traversal fell outside the cell list.
    Internal,
}

/// Failures raised while building or searching a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("no tables were retrieved")]
    EmptyInput,
    #[error("invalid argument: a sequence of tables is expected")]
    InvalidInputType,
    #[error("table at position {position} is malformed: {reason}")]
    MalformedTable { position: usize, reason: String },
    #[error("table at position {position} must have a name")]
    MissingTableName { position: usize },
    #[error("column `{column}` of table `{table}` has no referenced table property")]
    MissingReferenceTableProperty { table: String, column: String },
    #[error("no table named `{0}` exists in the graph")]
    TargetNotFound(String),
    #[error("index {index} is out of bounds for a cell list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("link endpoint `{0}` is missing from the target cell list")]
    UnresolvedLinkEndpoint(String),
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::TargetNotFound(_) => ErrorKind::NotFound,
            GraphError::IndexOutOfBounds { .. } | GraphError::UnresolvedLinkEndpoint(_) => {
                ErrorKind::Internal
            }
            _ => ErrorKind::Structural,
        }
    }

    /// Message suitable for showing to an end user instead of the raw error.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => INVALID_SEARCH_CRITERIA_MESSAGE,
            ErrorKind::Structural | ErrorKind::Internal => GRAPH_GENERATION_MESSAGE,
        }
    }
}

/// Result alias for graph construction and search.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Error type shared across erdscope crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or adapter failure.
    #[error("database error: {0}")]
    Db(String),
    /// Metadata could not be turned into a graph, or a search failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// A requested feature is not yet supported.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Graph(err) => err.user_message(),
            _ => DATABASE_RETRIEVAL_MESSAGE,
        }
    }
}

/// Convenience alias for results returned by erdscope crates.
pub type Result<T> = std::result::Result<T, Error>;
