use rowbind_api::error::{CoerceError, ErrorKind};
use rowbind_api::schema::ColumnType;

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    #[error("row {row}: expected {expected} cells, found {found}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}, column '{column}' ({declared}): {source}")]
    Cell {
        row: usize,
        column: String,
        declared: ColumnType,
        #[source]
        source: CoerceError,
    },

    #[error("malformed query response: {0}")]
    Response(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BindError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BindError::InvalidDestination(_) | BindError::RowLength { .. } => ErrorKind::Structural,
            BindError::Cell { source, .. } => source.kind(),
            BindError::Response(_) | BindError::Json(_) => ErrorKind::Format,
        }
    }

    /// Add context to the error.
    ///
    /// Only message-carrying variants take the context; structured variants
    /// are returned unchanged.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            BindError::InvalidDestination(msg) => {
                BindError::InvalidDestination(format!("{ctx}: {msg}"))
            }
            BindError::Response(msg) => BindError::Response(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
