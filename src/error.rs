//! Typed errors for table construction and cell rendering.
//!
//! Only schema problems surface as errors. Runtime actions (filtering,
//! sorting, paging, export) degrade instead of failing.

use thiserror::Error;

pub type Result<T, E = TableError> = std::result::Result<T, E>;

/// A malformed table definition, reported when the table is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("column #{index} has an empty accessor")]
    MissingAccessor { index: usize },

    #[error("column `{accessor}` has an empty header")]
    MissingHeader { accessor: String },

    #[error("multi-select column `{accessor}` has no options")]
    MissingOptions { accessor: String },

    #[error("accessor `{accessor}` is used by more than one column")]
    DuplicateAccessor { accessor: String },

    #[error("page size must be greater than 0")]
    InvalidPageSize,

    #[error("ordinal domain `{name}` has no ranks")]
    EmptyOrdinalDomain { name: String },

    #[error("unknown filter type `{0}`; expected `text` or `multi-select`")]
    UnknownFilterType(String),
}

/// Failure reported by a custom cell renderer.
///
/// The table catches it per cell and shows the raw value instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RenderError(pub String);

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
