//! In-memory row store
//!
//! Tables are ordered maps from identifier to row, so unsorted reads come
//! back in identifier order. Many-to-many pairs live in link tables keyed by
//! join table name; the other relation kinds read their key columns from
//! the rows themselves.
//!
//! Query evaluation follows SQL LEFT JOIN semantics. Each root row expands
//! into one joined row per combination of related rows (or a single
//! null-extended row when a relation is empty). Without `distinct`, a root
//! row is returned once per matching joined row.

use std::collections::{BTreeMap, BTreeSet};

use crate::compiler::Specification;
use crate::model::{DomainModel, JoinColumn, PageRequest, RelationLink, Row};

use super::errors::{StoreError, StoreResult};
use super::evaluate::ConditionEvaluator;
use super::sorter::RowSorter;
use super::RowStore;

/// Pairs of one join table, in the column order they were first written
#[derive(Debug, Clone, Default)]
struct LinkTable {
    columns: (String, String),
    pairs: BTreeSet<(i64, i64)>,
}

impl LinkTable {
    fn insert(&mut self, owner_column: &str, owner: i64, related: i64) {
        if self.columns.0 == owner_column {
            self.pairs.insert((owner, related));
        } else {
            self.pairs.insert((related, owner));
        }
    }

    fn related_ids(&self, owner_column: &str, owner: i64) -> Vec<i64> {
        if self.columns.0 == owner_column {
            self.pairs
                .iter()
                .filter(|(o, _)| *o == owner)
                .map(|(_, r)| *r)
                .collect()
        } else {
            let mut ids: Vec<i64> = self
                .pairs
                .iter()
                .filter(|(_, o)| *o == owner)
                .map(|(r, _)| *r)
                .collect();
            ids.sort_unstable();
            ids
        }
    }
}

/// Row store backed by ordered maps
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, BTreeMap<i64, Row>>,
    links: BTreeMap<String, LinkTable>,
}

impl MemoryStore {
    /// Creates an empty table for every entity of the model
    pub fn new(model: &DomainModel) -> Self {
        let tables = model
            .entities()
            .map(|entity| (entity.name().to_string(), BTreeMap::new()))
            .collect();
        Self {
            tables,
            links: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, entity: &str, row: Row) -> StoreResult<()> {
        let table = self
            .tables
            .get_mut(entity)
            .ok_or_else(|| StoreError::UnknownTable(entity.to_string()))?;
        if table.contains_key(&row.id()) {
            return Err(StoreError::DuplicateRow {
                entity: entity.to_string(),
                id: row.id(),
            });
        }
        table.insert(row.id(), row);
        Ok(())
    }

    /// Records a many-to-many pair.
    ///
    /// Both rows must exist. Links through foreign-key columns are written
    /// as ordinary column values instead.
    pub fn link(&mut self, link: &RelationLink, owner: i64, related: i64) -> StoreResult<()> {
        let (table, owner_column, related_column) = match &link.join_column {
            JoinColumn::JoinTable {
                table,
                owner_column,
                related_column,
            } => (table, owner_column, related_column),
            JoinColumn::ForeignKey(column) | JoinColumn::MappedBy(column) => {
                return Err(StoreError::InvalidDataset(format!(
                    "relation '{}' is stored in column '{}', not a join table",
                    link.qualified_name(),
                    column
                )))
            }
        };
        self.require_row(&link.owner_entity, owner)?;
        self.require_row(&link.related_entity, related)?;

        self.links
            .entry(table.clone())
            .or_insert_with(|| LinkTable {
                columns: (owner_column.clone(), related_column.clone()),
                pairs: BTreeSet::new(),
            })
            .insert(owner_column, owner, related);
        Ok(())
    }

    pub fn len(&self, entity: &str) -> StoreResult<usize> {
        Ok(self.table(entity)?.len())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.values().all(BTreeMap::is_empty)
    }

    fn table(&self, entity: &str) -> StoreResult<&BTreeMap<i64, Row>> {
        self.tables
            .get(entity)
            .ok_or_else(|| StoreError::UnknownTable(entity.to_string()))
    }

    fn require_row(&self, entity: &str, id: i64) -> StoreResult<&Row> {
        self.table(entity)?
            .get(&id)
            .ok_or_else(|| StoreError::RowNotFound {
                entity: entity.to_string(),
                id,
            })
    }

    /// Related rows of `owner` through `link`, in identifier order.
    ///
    /// Dangling keys are skipped, as a LEFT JOIN would find nothing there.
    fn related_rows(&self, link: &RelationLink, owner: &Row) -> StoreResult<Vec<&Row>> {
        let related = self.table(&link.related_entity)?;
        let rows = match &link.join_column {
            JoinColumn::ForeignKey(column) => owner
                .get(column)
                .as_int()
                .and_then(|id| related.get(&id))
                .into_iter()
                .collect(),
            JoinColumn::MappedBy(column) => related
                .values()
                .filter(|row| row.get(column).as_int() == Some(owner.id()))
                .collect(),
            JoinColumn::JoinTable {
                table,
                owner_column,
                ..
            } => match self.links.get(table) {
                Some(links) => links
                    .related_ids(owner_column, owner.id())
                    .into_iter()
                    .filter_map(|id| related.get(&id))
                    .collect(),
                None => Vec::new(),
            },
        };
        Ok(rows)
    }

    /// Rows matching `spec`, once per matching joined row unless distinct
    fn select(&self, spec: &Specification) -> StoreResult<Vec<Row>> {
        for link in spec.joins() {
            if link.owner_entity != spec.entity() {
                return Err(StoreError::InvalidJoin {
                    entity: spec.entity().to_string(),
                    relation: link.qualified_name(),
                });
            }
        }

        let mut selected = Vec::new();
        for row in self.table(spec.entity())?.values() {
            let mut tuples: Vec<Vec<Option<&Row>>> = vec![Vec::new()];
            for link in spec.joins() {
                let related = self.related_rows(link, row)?;
                let options: Vec<Option<&Row>> = if related.is_empty() {
                    vec![None]
                } else {
                    related.into_iter().map(Some).collect()
                };
                tuples = tuples
                    .into_iter()
                    .flat_map(|tuple| {
                        options.iter().map(move |option| {
                            let mut extended = tuple.clone();
                            extended.push(*option);
                            extended
                        })
                    })
                    .collect();
            }

            let matched = tuples
                .iter()
                .filter(|tuple| ConditionEvaluator::matches(row, tuple, spec.conditions()))
                .count();
            let copies = if spec.is_distinct() {
                matched.min(1)
            } else {
                matched
            };
            selected.extend(std::iter::repeat(row).take(copies).cloned());
        }
        Ok(selected)
    }
}

impl RowStore for MemoryStore {
    fn find(&self, spec: &Specification, page: Option<&PageRequest>) -> StoreResult<Vec<Row>> {
        let mut rows = self.select(spec)?;
        let page = match page {
            Some(page) => page,
            None => return Ok(rows),
        };
        RowSorter::sort(&mut rows, &page.sort);
        Ok(rows
            .into_iter()
            .skip(page.offset())
            .take(page.size)
            .collect())
    }

    fn count(&self, spec: &Specification) -> StoreResult<u64> {
        Ok(self.select(spec)?.len() as u64)
    }

    fn fetch_with_relation(
        &self,
        entity: &str,
        ids: &[i64],
        link: &RelationLink,
    ) -> StoreResult<Vec<Row>> {
        if link.owner_entity != entity {
            return Err(StoreError::InvalidJoin {
                entity: entity.to_string(),
                relation: link.qualified_name(),
            });
        }
        let wanted: BTreeSet<i64> = ids.iter().copied().collect();
        let mut parents = Vec::with_capacity(wanted.len());
        for row in self.table(entity)?.values() {
            if !wanted.contains(&row.id()) {
                continue;
            }
            let related = self
                .related_rows(link, row)?
                .into_iter()
                .cloned()
                .collect();
            let mut parent = row.clone();
            parent.set_relation(link.name.as_str(), related);
            parents.push(parent);
        }
        Ok(parents)
    }

    fn find_by_id(&self, entity: &str, id: i64) -> StoreResult<Option<Row>> {
        Ok(self.table(entity)?.get(&id).cloned())
    }
}
