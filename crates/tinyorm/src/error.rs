//! Error types for tinyorm

use thiserror::Error;

/// Result type alias for tinyorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for statement building and execution.
///
/// Builder-side variants are immediate, non-retryable usage errors: a failed
/// `build()` never returns partial SQL, and nothing is sent to the session.
/// Session-side errors pass through unwrapped; retry policy, if any, belongs
/// to the caller or the `Session` implementation.
#[derive(Debug, Error, PartialEq)]
pub enum OrmError {
    /// A clause referenced a field name that is not part of the model.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A result set returned a column that is not part of the model.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A direct-offset access was attempted with a model derived from a
    /// different entity type. The offsets would not describe the entity's
    /// memory, so the access is refused.
    #[error("model does not describe the entity type being accessed")]
    ModelMismatch,

    /// `Inserter::values` was called with no rows.
    #[error("insert statement has zero rows")]
    InsertZeroRows,

    /// `Updater::build` was called with no SET assignments.
    #[error("update statement has zero assignments")]
    UpdateZeroAssignments,

    /// A single-row fetch matched nothing.
    #[error("no rows returned")]
    NoRows,

    /// Row decode/mapping error
    #[error("decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Error surfaced by the underlying `Session` implementation.
    #[error("session error: {0}")]
    Session(String),

    /// A transaction failed and the subsequent rollback failed too.
    ///
    /// Both errors are preserved; neither is silently swallowed.
    #[error("{source} (rollback failed: {rollback})")]
    Rollback {
        source: Box<OrmError>,
        rollback: Box<OrmError>,
    },
}

impl OrmError {
    /// Create an unknown-field error
    pub fn unknown_field(name: impl Into<String>) -> Self {
        Self::UnknownField(name.into())
    }

    /// Create an unknown-column error
    pub fn unknown_column(name: impl Into<String>) -> Self {
        Self::UnknownColumn(name.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a session error
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session(message.into())
    }

    /// Check if this is a no-rows error
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows)
    }
}
