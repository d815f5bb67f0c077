//! Errors raised while decoding an audit feed.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Any of these aborts the whole parse. There is no per-advisory recovery.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document, or a value nested in it, does not have the expected JSON shape.
    #[error("unexpected structure at `{path}`: expected {expected}, found {found}")]
    Structure {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A required advisory field is missing or has the wrong type.
    #[error("invalid field `{field}` at `{path}`: {reason}")]
    Field {
        path: String,
        field: &'static str,
        reason: String,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParseError {
    pub fn is_structure(&self) -> bool {
        matches!(self, ParseError::Structure { .. })
    }

    pub fn is_field(&self) -> bool {
        matches!(self, ParseError::Field { .. })
    }
}
