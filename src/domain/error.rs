//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::DimensionType;

/// Domain errors represent violations of the dimension model.
///
/// Construction errors are fatal: a dimension is either valid or it does not exist.
/// Query-time absence is never an error, it is an empty result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("schema violation at '{item_id}': {message}")]
    SchemaViolation { item_id: String, message: String },

    #[error("duplicate item id: {0}")]
    DuplicateIdentifier(String),

    #[error("{relation} '{missing}' of item '{item_id}' not found in dimension")]
    ReferentialIntegrityViolation {
        item_id: String,
        relation: Relation,
        missing: String,
    },

    #[error("dimension has no items")]
    EmptyDimension,

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    DateFormatError(String),

    #[error("dimension '{0}' selected more than once")]
    AmbiguousDimension(DimensionType),

    #[error("malformed dimension document: {0}")]
    Decode(String),

    #[error("cannot encode dimension: {0}")]
    Encode(String),
}

/// Which link of an item failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Parent,
    Child,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relation::Parent => write!(f, "parent"),
            Relation::Child => write!(f, "child"),
        }
    }
}

impl DomainError {
    pub(crate) fn schema(item_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            item_id: item_id.into(),
            message: message.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
