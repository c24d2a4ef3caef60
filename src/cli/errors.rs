//! CLI-specific error types
//!
//! Every failure below the CLI keeps its own stable code so the JSON error
//! response names the layer that failed.

use std::io;

use thiserror::Error;

use crate::compiler::CompileError;
use crate::config::ConfigError;
use crate::request::RequestError;
use crate::service::QueryError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Model(#[from] CompileError),

    #[error("Failed to load dataset: {0}")]
    Dataset(#[from] StoreError),

    #[error("{0}")]
    Request(#[from] RequestError),

    #[error("{0}")]
    Query(#[from] QueryError),

    /// A `--param` that is not `key=value`
    #[error("Invalid parameter '{0}': expected key=value")]
    InvalidArgument(String),

    #[error("No {entity} with id {id}")]
    NotFound { entity: String, id: i64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        match self {
            CliError::Config(err) => err.code(),
            CliError::Model(err) => err.code().code(),
            CliError::Dataset(err) => err.code(),
            CliError::Request(err) => err.code(),
            CliError::Query(err) => err.code(),
            CliError::InvalidArgument(_) => "REEL_CLI_INVALID_ARGUMENT",
            CliError::NotFound { .. } => "REEL_CLI_NOT_FOUND",
            CliError::Io(_) => "REEL_CLI_IO_ERROR",
            CliError::Json(_) => "REEL_CLI_JSON_ERROR",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_come_from_the_failing_layer() {
        let err = CliError::from(RequestError::InvalidPaging("size=0".into()));
        assert_eq!(err.code_str(), "REEL_REQUEST_INVALID_PAGING");

        let err = CliError::InvalidArgument("title".into());
        assert_eq!(err.code_str(), "REEL_CLI_INVALID_ARGUMENT");
        assert!(err.to_string().contains("key=value"));
    }
}
