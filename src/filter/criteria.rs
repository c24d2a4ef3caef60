//! Criteria bundles
//!
//! A bundle maps field names to filter primitives. Fields without an entry
//! are unconstrained. Iteration is in field-name order so a bundle always
//! compiles to the same specification.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::primitive::FieldFilter;

/// The full set of optional field filters for one query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default)]
    filters: BTreeMap<String, FieldFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distinct: Option<bool>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the filter for `field`
    pub fn with(mut self, field: impl Into<String>, filter: impl Into<FieldFilter>) -> Self {
        self.set(field, filter);
        self
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = Some(distinct);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, filter: impl Into<FieldFilter>) {
        self.filters.insert(field.into(), filter.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldFilter> {
        self.filters.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut FieldFilter> {
        self.filters.get_mut(field)
    }

    /// Returns the entry for `field`, inserting `default` first if absent
    pub fn entry_or_insert(&mut self, field: &str, default: FieldFilter) -> &mut FieldFilter {
        self.filters.entry(field.to_string()).or_insert(default)
    }

    pub fn distinct(&self) -> Option<bool> {
        self.distinct
    }

    pub fn set_distinct(&mut self, distinct: Option<bool>) {
        self.distinct = distinct;
    }

    /// Present filters in field-name order
    pub fn filters(&self) -> btree_map::Iter<'_, String, FieldFilter> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// True when the bundle restricts nothing
    pub fn is_unconstrained(&self) -> bool {
        self.filters.values().all(FieldFilter::is_empty)
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Criteria{{")?;
        let mut first = true;
        for (field, filter) in &self.filters {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", field, filter)?;
            first = false;
        }
        if let Some(distinct) = self.distinct {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "distinct={}", distinct)?;
        }
        write!(f, "}}")
    }
}
