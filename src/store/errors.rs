//! # Row Store Errors

use thiserror::Error;

use crate::compiler::CompileError;
use crate::errors::{ErrorClass, Severity};

/// Result type for row store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Row store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Row {entity}#{id} already exists")]
    DuplicateRow { entity: String, id: i64 },

    #[error("Row {entity}#{id} not found")]
    RowNotFound { entity: String, id: i64 },

    #[error("Join '{relation}' does not start at '{entity}'")]
    InvalidJoin { entity: String, relation: String },

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Dataset model error: {0}")]
    Model(#[from] CompileError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::UnknownTable(_) => "REEL_STORE_UNKNOWN_TABLE",
            StoreError::DuplicateRow { .. } => "REEL_STORE_DUPLICATE_ROW",
            StoreError::RowNotFound { .. } => "REEL_STORE_ROW_NOT_FOUND",
            StoreError::InvalidJoin { .. } => "REEL_STORE_INVALID_JOIN",
            StoreError::InvalidDataset(_) | StoreError::Json(_) => "REEL_STORE_INVALID_DATASET",
            StoreError::Model(err) => err.code().code(),
            StoreError::Io(_) => "REEL_STORE_IO",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            StoreError::Model(err) => err.class(),
            _ => ErrorClass::Store,
        }
    }

    pub fn severity(&self) -> Severity {
        self.class().severity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_error_severity() {
        let err = StoreError::UnknownTable("studio".into());
        assert_eq!(err.code(), "REEL_STORE_UNKNOWN_TABLE");
        assert_eq!(err.severity(), Severity::Error);
        assert_eq!(err.to_string(), "Unknown table: studio");
    }

    #[test]
    fn test_model_errors_keep_their_class() {
        let err = StoreError::from(CompileError::unknown_entity("studio"));
        assert_eq!(err.class(), ErrorClass::Contract);
        assert_eq!(err.code(), "REEL_UNKNOWN_ENTITY");
    }
}
