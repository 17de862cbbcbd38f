//! Error types for the gridquery crate.

use thiserror::Error;

/// Errors that can occur when building or compiling grid queries.
///
/// Everything here is raised before any record is looked at. Once a query
/// has compiled, running it cannot fail.
#[derive(Debug, Error)]
pub enum GridError {
    /// A path segment does not exist on the type it was looked up on.
    #[error("field '{segment}' not found on '{schema}' (path '{path}')")]
    FieldNotFound {
        schema: &'static str,
        segment: String,
        path: String,
    },

    /// A dotted path is syntactically invalid (empty or non-identifier segment).
    #[error("invalid field path: '{0}'")]
    InvalidFieldPath(String),

    /// An operator code outside the supported set.
    #[error("unknown operator: '{0}'")]
    UnknownOperator(String),

    /// The filter rule-tree is not valid JSON of the expected shape.
    #[error("malformed filter payload: {0}")]
    MalformedFilterPayload(#[from] serde_json::Error),

    /// A flat request parameter could not be parsed.
    #[error("malformed request parameter '{name}': '{value}'")]
    MalformedParameter { name: &'static str, value: String },

    /// A reference field points at a schema that declares no identity field.
    #[error("schema '{schema}' has no identity field to compare references by")]
    MissingIdentity { schema: &'static str },

    /// Configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GridError {
    /// Returns `true` if the error was caused by caller-supplied input
    /// rather than by the record schema or the host configuration.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            GridError::MissingIdentity { .. } | GridError::InvalidConfig(_)
        )
    }
}

/// Result type for gridquery operations.
pub type Result<T> = std::result::Result<T, GridError>;
