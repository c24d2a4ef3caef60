//! Row ordering for paged reads
//!
//! Nulls sort first. Rows with equal keys keep identifier order, since the
//! sort is stable and rows arrive sorted by identifier.

use std::cmp::Ordering;

use crate::filter::Value;
use crate::model::{Row, SortDirection, SortOrder};

pub struct RowSorter;

impl RowSorter {
    /// Sorts rows by each order in turn
    pub fn sort(rows: &mut [Row], orders: &[SortOrder]) {
        if orders.is_empty() {
            return;
        }
        rows.sort_by(|a, b| {
            orders
                .iter()
                .map(|order| {
                    let ordering = Self::compare_values(a.get(&order.field), b.get(&order.field));
                    match order.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Total order over values: null < bool < int < text < instant
    fn compare_values(a: &Value, b: &Value) -> Ordering {
        let rank = |v: &Value| -> u8 {
            match v {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Int(_) => 2,
                Value::Text(_) => 3,
                Value::Instant(_) => 4,
            }
        };
        a.compare(b).unwrap_or_else(|| rank(a).cmp(&rank(b)))
    }
}
