//! Application-level errors (wraps domain and XML errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;
use crate::xml::XmlError;

/// Application errors wrap lower-layer errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Xml(#[from] XmlError),

    #[error("not a Trusted List document: {0}")]
    NotATrustedList(PathBuf),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
