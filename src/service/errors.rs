//! Query service errors
//!
//! The service only composes other layers, so its error wraps theirs and
//! keeps their codes and severities.

use thiserror::Error;

use crate::compiler::CompileError;
use crate::errors::{ErrorClass, Severity};
use crate::materializer::MaterializeError;
use crate::store::StoreError;

/// Result type for query service operations
pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Materialize(#[from] MaterializeError),

    #[error("Invalid page request: {0}")]
    InvalidPage(String),
}

impl QueryError {
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Compile(err) => err.code().code(),
            QueryError::Store(err) => err.code(),
            QueryError::Materialize(err) => err.code().code(),
            QueryError::InvalidPage(_) => "REEL_QUERY_INVALID_PAGE",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            QueryError::Compile(err) => err.class(),
            QueryError::Store(err) => err.class(),
            QueryError::Materialize(err) => err.class(),
            QueryError::InvalidPage(_) => ErrorClass::UserInput,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            QueryError::Compile(err) => err.severity(),
            QueryError::Store(err) => err.severity(),
            QueryError::Materialize(err) => err.severity(),
            QueryError::InvalidPage(_) => self.class().severity(),
        }
    }
}
