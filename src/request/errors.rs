//! # Request Errors
//!
//! Malformed request parameters. These are user-input errors: the request
//! is rejected before anything is compiled.

use thiserror::Error;

use crate::compiler::CompileError;
use crate::errors::{ErrorClass, Severity};

/// Result type for request parsing
pub type RequestResult<T> = Result<T, RequestError>;

#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// Parameter name is not `field.operator` or a paging key
    #[error("Invalid query parameter: {0}")]
    InvalidParam(String),

    #[error("Unknown filter field '{field}' on '{entity}'")]
    UnknownField { entity: String, field: String },

    #[error("Operator '{operator}' is not supported on {kind} field '{field}'")]
    UnsupportedOperator {
        field: String,
        operator: String,
        kind: String,
    },

    #[error("Invalid value for '{param}': {reason}")]
    InvalidValue { param: String, reason: String },

    #[error("Invalid paging: {0}")]
    InvalidPaging(String),

    #[error("Cannot sort by '{0}'")]
    UnknownSortField(String),

    #[error("{0}")]
    Model(#[from] CompileError),
}

impl RequestError {
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::InvalidParam(_) => "REEL_REQUEST_INVALID_PARAM",
            RequestError::UnknownField { .. } => "REEL_REQUEST_UNKNOWN_FIELD",
            RequestError::UnsupportedOperator { .. } => "REEL_REQUEST_UNSUPPORTED_OPERATOR",
            RequestError::InvalidValue { .. } => "REEL_REQUEST_INVALID_VALUE",
            RequestError::InvalidPaging(_) => "REEL_REQUEST_INVALID_PAGING",
            RequestError::UnknownSortField(_) => "REEL_REQUEST_UNKNOWN_SORT_FIELD",
            RequestError::Model(err) => err.code().code(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            RequestError::Model(err) => err.class(),
            _ => ErrorClass::UserInput,
        }
    }

    pub fn severity(&self) -> Severity {
        self.class().severity()
    }

    /// HTTP status a web layer would answer with
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::Model(_) => 500,
            _ => 400,
        }
    }
}
