//! XML-level errors

use thiserror::Error;

/// Errors raised while parsing, walking or writing an XML document.
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML parsing error: {0}")]
    Parse(String),

    #[error("XML serialization error: {0}")]
    Serialize(String),

    #[error("invalid XML structure: {0}")]
    Structure(String),

    #[error("missing required element: {0}")]
    MissingElement(String),

    #[error("stale node handle")]
    StaleNode,
}

/// Result type for XML operations.
pub type XmlResult<T> = Result<T, XmlError>;
