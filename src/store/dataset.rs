//! Dataset loader for seeding a memory store from disk
//!
//! A dataset is one JSON document:
//!
//! ```json
//! { "entities": { "film": [ { "id": 1, "title": "The Matrix", "url": "m" } ] },
//!   "links": [ { "entity": "film", "relation": "people", "owner": 1, "related": 4 } ] }
//! ```
//!
//! Every column is checked against the domain model. Unknown columns,
//! mistyped values and missing required values reject the whole dataset.
//! Links are only for join-table relations; foreign keys are plain columns.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::filter::Value;
use crate::model::{DomainModel, EntityModel, Row, IDENTIFIER};
use crate::observability::{log_event, Event};

use super::errors::{StoreError, StoreResult};
use super::memory::MemoryStore;

/// Raw dataset document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub entities: BTreeMap<String, Vec<Map<String, JsonValue>>>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

/// One many-to-many pair
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkRecord {
    pub entity: String,
    pub relation: String,
    pub owner: i64,
    pub related: i64,
}

impl Dataset {
    pub fn from_json(content: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Builds a store holding this dataset's rows and links
    pub fn into_store(self, model: &DomainModel) -> StoreResult<MemoryStore> {
        let mut store = MemoryStore::new(model);

        for (entity_name, records) in &self.entities {
            let entity = model.entity(entity_name)?;
            for (index, record) in records.iter().enumerate() {
                let row = row_from_record(entity, record).map_err(|reason| {
                    StoreError::InvalidDataset(format!(
                        "{}[{}]: {}",
                        entity_name, index, reason
                    ))
                })?;
                store.insert(entity_name, row)?;
            }
        }

        for record in &self.links {
            let link = model.relation(&record.entity, &record.relation)?;
            store.link(link, record.owner, record.related)?;
        }
        Ok(store)
    }
}

/// Reads and validates a dataset file
pub fn load_dataset(path: &Path, model: &DomainModel) -> StoreResult<MemoryStore> {
    let content = fs::read_to_string(path)?;
    let store = Dataset::from_json(&content)?.into_store(model)?;

    let path_str = path.display().to_string();
    let rows = model
        .entities()
        .map(|entity| store.len(entity.name()).unwrap_or(0))
        .sum::<usize>()
        .to_string();
    log_event(
        Event::DatasetLoaded,
        &[("path", path_str.as_str()), ("rows", rows.as_str())],
    );
    Ok(store)
}

fn row_from_record(entity: &EntityModel, record: &Map<String, JsonValue>) -> Result<Row, String> {
    for column in record.keys() {
        if entity.field_def(column).is_none() {
            return Err(format!("unknown column '{}'", column));
        }
    }

    let id = record
        .get(IDENTIFIER)
        .and_then(JsonValue::as_i64)
        .ok_or_else(|| format!("missing or non-integer '{}'", IDENTIFIER))?;
    let mut row = Row::new(id);

    for field in entity.fields().iter().filter(|f| f.name != IDENTIFIER) {
        let value = match record.get(&field.name) {
            Some(json) => field
                .scalar
                .from_json(json)
                .map_err(|e| format!("column '{}': {}", field.name, e))?,
            None => Value::Null,
        };
        if value.is_null() {
            if !field.nullable {
                return Err(format!("column '{}' is required", field.name));
            }
            continue;
        }
        row.set(field.name.as_str(), value);
    }
    Ok(row)
}
