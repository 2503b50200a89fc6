//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the document model's rules.
/// These are independent of XML and I/O concerns.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid duplication counter in '{item}': '{suffix}' is not a number")]
    InvalidDuplicationCounter { item: String, suffix: String },

    #[error("node not found in tree")]
    NodeNotFound,

    #[error("cannot attach {child} node below {parent} node")]
    InvalidChild { parent: String, child: String },

    #[error("tree has no root node")]
    EmptyTree,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
