//! Condition evaluation over joined rows
//!
//! A joined row is a root row plus at most one related row per join of the
//! specification. A missing related row (the LEFT JOIN found nothing) reads
//! every column as null.

use crate::compiler::{Condition, FieldPath};
use crate::filter::Value;
use crate::model::Row;

static NULL: Value = Value::Null;

/// Evaluates specification conditions against joined rows
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Checks if a joined row satisfies all conditions
    pub fn matches(root: &Row, joined: &[Option<&Row>], conditions: &[Condition]) -> bool {
        conditions
            .iter()
            .all(|condition| condition.test.matches(Self::column(root, joined, &condition.path)))
    }

    fn column<'r>(root: &'r Row, joined: &[Option<&'r Row>], path: &FieldPath) -> &'r Value {
        match path.join {
            None => root.get(&path.field),
            Some(index) => match joined.get(index).copied().flatten() {
                Some(row) => row.get(&path.field),
                None => &NULL,
            },
        }
    }
}
