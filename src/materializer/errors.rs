//! Materializer error types
//!
//! Error codes:
//! - REEL_DUPLICATE_PARENT (FATAL)
//! - REEL_MISSING_PARENT (ERROR)
//! - REEL_UNEXPECTED_PARENT (ERROR)
//! - REEL_MATERIALIZE_STORE (ERROR)

use std::fmt;

use crate::errors::{ErrorClass, Severity};
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterializeErrorCode {
    /// The caller passed the same parent twice
    ReelDuplicateParent,
    /// A parent vanished between the first query and the re-fetch
    ReelMissingParent,
    /// The re-fetch returned a parent that was not asked for
    ReelUnexpectedParent,
    /// The re-fetch itself failed
    ReelMaterializeStore,
}

impl MaterializeErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            MaterializeErrorCode::ReelDuplicateParent => "REEL_DUPLICATE_PARENT",
            MaterializeErrorCode::ReelMissingParent => "REEL_MISSING_PARENT",
            MaterializeErrorCode::ReelUnexpectedParent => "REEL_UNEXPECTED_PARENT",
            MaterializeErrorCode::ReelMaterializeStore => "REEL_MATERIALIZE_STORE",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            MaterializeErrorCode::ReelDuplicateParent => ErrorClass::Contract,
            MaterializeErrorCode::ReelMissingParent
            | MaterializeErrorCode::ReelUnexpectedParent => ErrorClass::Consistency,
            MaterializeErrorCode::ReelMaterializeStore => ErrorClass::Store,
        }
    }

    pub fn severity(&self) -> Severity {
        self.class().severity()
    }
}

impl fmt::Display for MaterializeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Materializer error with the offending parent ids
#[derive(Debug)]
pub struct MaterializeError {
    code: MaterializeErrorCode,
    relation: String,
    ids: Vec<i64>,
    message: String,
    source: Option<StoreError>,
}

impl MaterializeError {
    pub fn duplicate_parent(relation: impl Into<String>, id: i64) -> Self {
        let relation = relation.into();
        Self {
            code: MaterializeErrorCode::ReelDuplicateParent,
            message: format!("Parent {} appears more than once while loading '{}'", id, relation),
            relation,
            ids: vec![id],
            source: None,
        }
    }

    pub fn missing_parents(relation: impl Into<String>, ids: Vec<i64>) -> Self {
        let relation = relation.into();
        Self {
            code: MaterializeErrorCode::ReelMissingParent,
            message: format!(
                "Re-fetch for '{}' did not return parents {:?}",
                relation, ids
            ),
            relation,
            ids,
            source: None,
        }
    }

    pub fn unexpected_parent(relation: impl Into<String>, id: i64) -> Self {
        let relation = relation.into();
        Self {
            code: MaterializeErrorCode::ReelUnexpectedParent,
            message: format!(
                "Re-fetch for '{}' returned parent {} which was not requested",
                relation, id
            ),
            relation,
            ids: vec![id],
            source: None,
        }
    }

    pub fn store(relation: impl Into<String>, err: StoreError) -> Self {
        let relation = relation.into();
        Self {
            code: MaterializeErrorCode::ReelMaterializeStore,
            message: format!("Re-fetch for '{}' failed: {}", relation, err),
            relation,
            ids: Vec::new(),
            source: Some(err),
        }
    }

    pub fn code(&self) -> MaterializeErrorCode {
        self.code
    }

    /// Qualified relation name, e.g. `film.people`
    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
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

impl fmt::Display for MaterializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code, self.message)
    }
}

impl std::error::Error for MaterializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

pub type MaterializeResult<T> = Result<T, MaterializeError>;
