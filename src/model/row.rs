//! Rows returned by the store

use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use super::entity::IDENTIFIER;
use crate::filter::Value;

static NULL: Value = Value::Null;

/// One entity row, optionally with loaded relations
///
/// The identifier is fixed at construction and mirrored into the column
/// map so predicates can address it like any other column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    id: i64,
    values: BTreeMap<String, Value>,
    relations: BTreeMap<String, Vec<Row>>,
}

impl Row {
    pub fn new(id: i64) -> Self {
        let mut values = BTreeMap::new();
        values.insert(IDENTIFIER.to_string(), Value::Int(id));
        Self {
            id,
            values,
            relations: BTreeMap::new(),
        }
    }

    /// Builder-style column setter
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Column value; unset columns read as null
    pub fn get(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&NULL)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        if column == IDENTIFIER {
            return;
        }
        self.values.insert(column, value.into());
    }

    /// Columns other than the identifier
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != IDENTIFIER)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Loaded rows of a relation; None when the relation was not fetched
    pub fn relation(&self, name: &str) -> Option<&[Row]> {
        self.relations.get(name).map(Vec::as_slice)
    }

    pub fn set_relation(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        self.relations.insert(name.into(), rows);
    }

    /// Removes and returns the loaded rows of a relation
    pub fn take_relation(&mut self, name: &str) -> Option<Vec<Row>> {
        self.relations.remove(name)
    }

    pub fn is_loaded(&self, relation: &str) -> bool {
        self.relations.contains_key(relation)
    }

    /// JSON object of columns and loaded relations
    pub fn to_json(&self) -> JsonValue {
        let mut object = Map::new();
        for (column, value) in &self.values {
            object.insert(column.clone(), value.to_json());
        }
        for (name, rows) in &self.relations {
            let rows = rows.iter().map(Row::to_json).collect();
            object.insert(name.clone(), JsonValue::Array(rows));
        }
        JsonValue::Object(object)
    }
}
