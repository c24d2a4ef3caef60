//! Compiled query predicates
//!
//! A `Specification` is the store-facing form of a criteria bundle: a root
//! entity, the relation joins the predicate needs, a conjunction of column
//! tests and the distinct flag. It is immutable once built and is the only
//! input to both `find` and `count`.

use std::cmp::Ordering;
use std::fmt;

use crate::filter::Value;
use crate::model::RelationLink;

use super::errors::{CompileError, CompileResult};

/// Ordered comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl RangeOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            RangeOp::Gt => ">",
            RangeOp::Gte => ">=",
            RangeOp::Lt => "<",
            RangeOp::Lte => "<=",
        }
    }

    /// True if `actual <op> bound` holds for the given ordering of actual vs bound
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            RangeOp::Gt => ordering == Ordering::Greater,
            RangeOp::Gte => ordering != Ordering::Less,
            RangeOp::Lt => ordering == Ordering::Less,
            RangeOp::Lte => ordering != Ordering::Greater,
        }
    }
}

/// One test applied to one column
#[derive(Debug, Clone, PartialEq)]
pub enum Test {
    Equals(Value),
    NotEquals(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    /// true: IS NOT NULL, false: IS NULL
    Specified(bool),
    Range(RangeOp, Value),
    Contains(String),
    NotContains(String),
}

impl Test {
    /// Evaluates the test with SQL null semantics.
    ///
    /// A null column fails every test except `Specified(false)` and an
    /// empty `NotIn`.
    pub fn matches(&self, actual: &Value) -> bool {
        match self {
            Test::Specified(specified) => actual.is_null() != *specified,
            Test::NotIn(values) if values.is_empty() => true,
            _ if actual.is_null() => false,
            Test::Equals(expected) => actual == expected,
            Test::NotEquals(expected) => actual != expected,
            Test::In(values) => values.contains(actual),
            Test::NotIn(values) => !values.contains(actual),
            Test::Range(op, bound) => actual
                .compare(bound)
                .map(|ordering| op.holds(ordering))
                .unwrap_or(false),
            Test::Contains(needle) => actual.as_text().map_or(false, |s| s.contains(needle.as_str())),
            Test::NotContains(needle) => {
                actual.as_text().map_or(false, |s| !s.contains(needle.as_str()))
            }
        }
    }
}

/// A column on the root entity or on a joined relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    /// Index into the specification's joins; None for the root entity
    pub join: Option<usize>,
    pub field: String,
}

impl FieldPath {
    pub fn root(field: impl Into<String>) -> Self {
        Self {
            join: None,
            field: field.into(),
        }
    }

    pub fn joined(join: usize, field: impl Into<String>) -> Self {
        Self {
            join: Some(join),
            field: field.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub path: FieldPath,
    pub test: Test,
}

/// A composable predicate over the rows of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    entity: String,
    distinct: bool,
    joins: Vec<RelationLink>,
    conditions: Vec<Condition>,
}

impl Specification {
    /// Matches every row of `entity`
    pub fn all(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            distinct: false,
            joins: Vec::new(),
            conditions: Vec::new(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// LEFT JOINs, addressed by index from `FieldPath::join`
    pub fn joins(&self) -> &[RelationLink] {
        &self.joins
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// True when the specification constrains nothing and joins nothing
    pub fn is_identity(&self) -> bool {
        self.joins.is_empty() && self.conditions.is_empty()
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub(crate) fn push_join(&mut self, link: RelationLink) -> usize {
        self.joins.push(link);
        self.joins.len() - 1
    }

    pub(crate) fn push_condition(&mut self, path: FieldPath, test: Test) {
        self.conditions.push(Condition { path, test });
    }

    /// Conjunction of two specifications over the same entity.
    ///
    /// Joins of `other` are appended and its conditions re-pointed at them.
    /// The result is distinct if either side is.
    pub fn and(mut self, other: Specification) -> CompileResult<Self> {
        if self.entity != other.entity {
            return Err(CompileError::specification_mismatch(
                &self.entity,
                &other.entity,
            ));
        }
        let offset = self.joins.len();
        self.distinct |= other.distinct;
        self.joins.extend(other.joins);
        self.conditions
            .extend(other.conditions.into_iter().map(|mut condition| {
                condition.path.join = condition.path.join.map(|j| j + offset);
                condition
            }));
        Ok(self)
    }

    fn alias(&self, path: &FieldPath) -> String {
        match path.join {
            Some(j) => format!("j{}.{}", j, path.field),
            None => format!("{}.{}", self.entity, path.field),
        }
    }
}

fn value_list(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        write!(f, "{}.* FROM {}", self.entity, self.entity)?;
        for (i, join) in self.joins.iter().enumerate() {
            write!(f, " LEFT JOIN {} j{} ON {}", join.related_entity, i, join.qualified_name())?;
        }
        for (i, condition) in self.conditions.iter().enumerate() {
            f.write_str(if i == 0 { " WHERE " } else { " AND " })?;
            let column = self.alias(&condition.path);
            match &condition.test {
                Test::Equals(v) => write!(f, "{} = {}", column, v)?,
                Test::NotEquals(v) => write!(f, "{} <> {}", column, v)?,
                Test::In(vs) => write!(f, "{} IN ({})", column, value_list(vs))?,
                Test::NotIn(vs) => write!(f, "{} NOT IN ({})", column, value_list(vs))?,
                Test::Specified(true) => write!(f, "{} IS NOT NULL", column)?,
                Test::Specified(false) => write!(f, "{} IS NULL", column)?,
                Test::Range(op, v) => write!(f, "{} {} {}", column, op.symbol(), v)?,
                Test::Contains(s) => write!(f, "{} LIKE '%{}%'", column, s)?,
                Test::NotContains(s) => write!(f, "{} NOT LIKE '%{}%'", column, s)?,
            }
        }
        Ok(())
    }
}
