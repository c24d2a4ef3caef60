//! Compiler and model error types
//!
//! Error codes:
//! - REEL_UNKNOWN_ENTITY (FATAL)
//! - REEL_UNKNOWN_FIELD (FATAL)
//! - REEL_FILTER_TYPE_MISMATCH (FATAL)
//! - REEL_RELATION_MISCONFIGURED (FATAL)
//! - REEL_DUPLICATE_DEFINITION (FATAL)
//! - REEL_SPECIFICATION_MISMATCH (FATAL)
//!
//! Filter typing is fixed when a bundle is built, so every compile error is
//! a programmer error and never a response to user input.

use std::fmt;

use crate::errors::{ErrorClass, Severity};

/// Compiler-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorCode {
    /// Entity name not present in the domain model
    ReelUnknownEntity,
    /// Criteria key is neither an attribute nor a relation filter
    ReelUnknownField,
    /// Filter family does not match the field's declared type
    ReelFilterTypeMismatch,
    /// Relation link inconsistent with the model
    ReelRelationMisconfigured,
    /// Entity, field or relation declared twice
    ReelDuplicateDefinition,
    /// Specifications over different entities combined
    ReelSpecificationMismatch,
}

impl CompileErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            CompileErrorCode::ReelUnknownEntity => "REEL_UNKNOWN_ENTITY",
            CompileErrorCode::ReelUnknownField => "REEL_UNKNOWN_FIELD",
            CompileErrorCode::ReelFilterTypeMismatch => "REEL_FILTER_TYPE_MISMATCH",
            CompileErrorCode::ReelRelationMisconfigured => "REEL_RELATION_MISCONFIGURED",
            CompileErrorCode::ReelDuplicateDefinition => "REEL_DUPLICATE_DEFINITION",
            CompileErrorCode::ReelSpecificationMismatch => "REEL_SPECIFICATION_MISMATCH",
        }
    }

    pub fn class(&self) -> ErrorClass {
        ErrorClass::Contract
    }

    pub fn severity(&self) -> Severity {
        self.class().severity()
    }
}

impl fmt::Display for CompileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Compile error with context
#[derive(Debug, Clone)]
pub struct CompileError {
    code: CompileErrorCode,
    entity: String,
    message: String,
}

impl CompileError {
    pub fn unknown_entity(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self {
            code: CompileErrorCode::ReelUnknownEntity,
            message: format!("Entity '{}' is not part of the domain model", entity),
            entity,
        }
    }

    pub fn unknown_field(entity: impl Into<String>, field: &str) -> Self {
        let entity = entity.into();
        Self {
            code: CompileErrorCode::ReelUnknownField,
            message: format!("Entity '{}' has no filterable field '{}'", entity, field),
            entity,
        }
    }

    pub fn type_mismatch(
        entity: impl Into<String>,
        field: &str,
        expected: &str,
        actual: &str,
    ) -> Self {
        let entity = entity.into();
        Self {
            code: CompileErrorCode::ReelFilterTypeMismatch,
            message: format!(
                "Field '{}.{}' is {} but was given a {} filter",
                entity, field, expected, actual
            ),
            entity,
        }
    }

    pub fn relation_misconfigured(
        entity: impl Into<String>,
        relation: &str,
        reason: impl Into<String>,
    ) -> Self {
        let entity = entity.into();
        Self {
            code: CompileErrorCode::ReelRelationMisconfigured,
            message: format!("Relation '{}.{}': {}", entity, relation, reason.into()),
            entity,
        }
    }

    pub fn duplicate(entity: impl Into<String>, what: &str) -> Self {
        let entity = entity.into();
        Self {
            code: CompileErrorCode::ReelDuplicateDefinition,
            message: format!("'{}' is defined twice on '{}'", what, entity),
            entity,
        }
    }

    pub fn specification_mismatch(left: &str, right: &str) -> Self {
        Self {
            code: CompileErrorCode::ReelSpecificationMismatch,
            entity: left.to_string(),
            message: format!(
                "Cannot combine a '{}' specification with a '{}' specification",
                left, right
            ),
        }
    }

    pub fn code(&self) -> CompileErrorCode {
        self.code
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn class(&self) -> ErrorClass {
        self.code.class()
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code, self.message)
    }
}

impl std::error::Error for CompileError {}

/// Result type for compiler and model operations
pub type CompileResult<T> = Result<T, CompileError>;
