//! Order-preserving collection materializer
//!
//! Loading a to-many relation with a join duplicates the parent once per
//! related row. The materializer instead takes an already ordered batch of
//! parents, issues one `fetch_with_relation` for all of them, and attaches
//! each parent's related rows back in the original order.
//!
//! Guarantees on success:
//! - output length equals input length
//! - `output[i].id() == input[i].id()`
//! - no parent appears twice
//!
//! Relations loaded on the input rows before the call are kept.

use std::collections::HashMap;

use crate::model::{Page, RelationLink, Row};
use crate::observability::{log_event, log_event_at, log_severity, Event};
use crate::store::RowStore;

use super::errors::{MaterializeError, MaterializeResult};

/// Attaches a to-many relation to an ordered batch of parents
#[derive(Debug)]
pub struct CollectionMaterializer<'s, S: RowStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: RowStore + ?Sized> CollectionMaterializer<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Loads `link` for every parent, preserving parent order.
    ///
    /// An empty batch returns immediately without querying the store.
    pub fn materialize(
        &self,
        mut parents: Vec<Row>,
        link: &RelationLink,
    ) -> MaterializeResult<Vec<Row>> {
        let relation = link.qualified_name();
        if parents.is_empty() {
            log_event(Event::MaterializeSkipped, &[("relation", relation.as_str())]);
            return Ok(parents);
        }

        let mut positions = HashMap::with_capacity(parents.len());
        for (index, parent) in parents.iter().enumerate() {
            if positions.insert(parent.id(), index).is_some() {
                return Err(fault(MaterializeError::duplicate_parent(
                    relation.as_str(),
                    parent.id(),
                )));
            }
        }

        let ids: Vec<i64> = parents.iter().map(Row::id).collect();
        let count = ids.len().to_string();
        log_event(
            Event::MaterializeStart,
            &[("relation", relation.as_str()), ("parents", count.as_str())],
        );

        let fetched = self
            .store
            .fetch_with_relation(&link.owner_entity, &ids, link)
            .map_err(|e| fault(MaterializeError::store(relation.as_str(), e)))?;

        let mut loaded: Vec<Option<Vec<Row>>> = vec![None; parents.len()];
        for mut row in fetched {
            let index = match positions.get(&row.id()) {
                Some(index) => *index,
                None => {
                    return Err(fault(MaterializeError::unexpected_parent(
                        relation.as_str(),
                        row.id(),
                    )))
                }
            };
            // A parent returned twice is collapsed to its first occurrence
            if loaded[index].is_none() {
                loaded[index] = Some(row.take_relation(&link.name).unwrap_or_default());
            }
        }

        let missing: Vec<i64> = ids
            .iter()
            .zip(&loaded)
            .filter(|(_, related)| related.is_none())
            .map(|(id, _)| *id)
            .collect();
        if !missing.is_empty() {
            return Err(fault(MaterializeError::missing_parents(relation.as_str(), missing)));
        }

        for (parent, related) in parents.iter_mut().zip(loaded) {
            parent.set_relation(link.name.as_str(), related.unwrap_or_default());
        }

        log_event(
            Event::MaterializeComplete,
            &[("relation", relation.as_str()), ("parents", count.as_str())],
        );
        Ok(parents)
    }

    /// Loads `link` for a single optional parent
    pub fn materialize_one(
        &self,
        parent: Option<Row>,
        link: &RelationLink,
    ) -> MaterializeResult<Option<Row>> {
        match parent {
            Some(parent) => Ok(self.materialize(vec![parent], link)?.into_iter().next()),
            None => {
                log_event(
                    Event::MaterializeSkipped,
                    &[("relation", link.qualified_name().as_str())],
                );
                Ok(None)
            }
        }
    }

    /// Loads `link` for a page's content, keeping the page metadata
    pub fn materialize_page(
        &self,
        page: Page<Row>,
        link: &RelationLink,
    ) -> MaterializeResult<Page<Row>> {
        let (content, request, total) = page.into_parts();
        let content = self.materialize(content, link)?;
        Ok(Page::new(content, request, total))
    }
}

fn fault(err: MaterializeError) -> MaterializeError {
    let ids = format!("{:?}", err.ids());
    log_event_at(
        Event::MaterializeFault,
        log_severity(err.severity()),
        &[
            ("code", err.code().code()),
            ("ids", ids.as_str()),
            ("relation", err.relation()),
        ],
    );
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::compiler::Specification;
    use crate::materializer::MaterializeErrorCode;
    use crate::model::{catalog_model, DomainModel, PageRequest};
    use crate::store::{MemoryStore, StoreResult};

    fn seeded() -> (DomainModel, MemoryStore) {
        let model = catalog_model().unwrap();
        let mut store = MemoryStore::new(&model);
        for id in 1..=3 {
            store
                .insert("film", Row::new(id).with("title", format!("F{}", id)).with("url", "u"))
                .unwrap();
        }
        for id in 10..=12 {
            store.insert("person", Row::new(id).with("name", "P")).unwrap();
        }
        let people = model.relation("film", "people").unwrap().clone();
        store.link(&people, 1, 10).unwrap();
        store.link(&people, 1, 11).unwrap();
        store.link(&people, 1, 12).unwrap();
        store.link(&people, 3, 10).unwrap();
        (model, store)
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().map(Row::id).collect()
    }

    /// Store wrapper that counts re-fetches and can tamper with the result
    #[derive(Debug)]
    struct Probe<'a> {
        inner: &'a MemoryStore,
        fetches: AtomicUsize,
        drop_id: Option<i64>,
        extra_id: Option<i64>,
        duplicate: bool,
    }

    impl<'a> Probe<'a> {
        fn new(inner: &'a MemoryStore) -> Self {
            Self {
                inner,
                fetches: AtomicUsize::new(0),
                drop_id: None,
                extra_id: None,
                duplicate: false,
            }
        }
    }

    impl RowStore for Probe<'_> {
        fn find(&self, spec: &Specification, page: Option<&PageRequest>) -> StoreResult<Vec<Row>> {
            self.inner.find(spec, page)
        }

        fn count(&self, spec: &Specification) -> StoreResult<u64> {
            self.inner.count(spec)
        }

        fn fetch_with_relation(
            &self,
            entity: &str,
            ids: &[i64],
            link: &RelationLink,
        ) -> StoreResult<Vec<Row>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.inner.fetch_with_relation(entity, ids, link)?;
            rows.reverse();
            if let Some(id) = self.drop_id {
                rows.retain(|row| row.id() != id);
            }
            if let Some(id) = self.extra_id {
                rows.push(Row::new(id));
            }
            if self.duplicate {
                let first = rows[0].clone();
                rows.push(first);
            }
            Ok(rows)
        }

        fn find_by_id(&self, entity: &str, id: i64) -> StoreResult<Option<Row>> {
            self.inner.find_by_id(entity, id)
        }
    }

    #[test]
    fn test_preserves_order_and_attaches_relation() {
        let (model, store) = seeded();
        let people = model.relation("film", "people").unwrap();
        let parents = vec![Row::new(3), Row::new(1), Row::new(2)];

        let out = CollectionMaterializer::new(&store)
            .materialize(parents, people)
            .unwrap();
        assert_eq!(ids(&out), vec![3, 1, 2]);
        assert_eq!(ids(out[0].relation("people").unwrap()), vec![10]);
        assert_eq!(ids(out[1].relation("people").unwrap()), vec![10, 11, 12]);
        assert_eq!(out[2].relation("people").map(<[Row]>::len), Some(0));
    }

    #[test]
    fn test_empty_input_issues_no_query() {
        let (model, store) = seeded();
        let probe = Probe::new(&store);
        let people = model.relation("film", "people").unwrap();

        let out = CollectionMaterializer::new(&probe)
            .materialize(Vec::new(), people)
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(probe.fetches.load(Ordering::SeqCst), 0);

        let one = CollectionMaterializer::new(&probe)
            .materialize_one(None, people)
            .unwrap();
        assert!(one.is_none());
        assert_eq!(probe.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_one_query_per_batch() {
        let (model, store) = seeded();
        let probe = Probe::new(&store);
        let people = model.relation("film", "people").unwrap();

        CollectionMaterializer::new(&probe)
            .materialize(vec![Row::new(1), Row::new(2), Row::new(3)], people)
            .unwrap();
        assert_eq!(probe.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_duplicate_input_is_fatal_and_skips_query() {
        let (model, store) = seeded();
        let probe = Probe::new(&store);
        let people = model.relation("film", "people").unwrap();

        let err = CollectionMaterializer::new(&probe)
            .materialize(vec![Row::new(1), Row::new(2), Row::new(1)], people)
            .unwrap_err();
        assert_eq!(err.code(), MaterializeErrorCode::ReelDuplicateParent);
        assert!(err.is_fatal());
        assert_eq!(probe.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_parent_is_reported() {
        let (model, store) = seeded();
        let mut probe = Probe::new(&store);
        probe.drop_id = Some(2);
        let people = model.relation("film", "people").unwrap();

        let err = CollectionMaterializer::new(&probe)
            .materialize(vec![Row::new(1), Row::new(2)], people)
            .unwrap_err();
        assert_eq!(err.code(), MaterializeErrorCode::ReelMissingParent);
        assert_eq!(err.ids(), &[2]);
    }

    #[test]
    fn test_unexpected_parent_is_reported() {
        let (model, store) = seeded();
        let mut probe = Probe::new(&store);
        probe.extra_id = Some(99);
        let people = model.relation("film", "people").unwrap();

        let err = CollectionMaterializer::new(&probe)
            .materialize(vec![Row::new(1)], people)
            .unwrap_err();
        assert_eq!(err.code(), MaterializeErrorCode::ReelUnexpectedParent);
    }

    #[test]
    fn test_duplicate_refetch_rows_collapse() {
        let (model, store) = seeded();
        let mut probe = Probe::new(&store);
        probe.duplicate = true;
        let people = model.relation("film", "people").unwrap();

        let out = CollectionMaterializer::new(&probe)
            .materialize(vec![Row::new(1), Row::new(3)], people)
            .unwrap();
        assert_eq!(ids(&out), vec![1, 3]);
    }

    #[test]
    fn test_page_keeps_metadata() {
        let (model, store) = seeded();
        let people = model.relation("film", "people").unwrap();
        let page = Page::new(vec![Row::new(2), Row::new(1)], PageRequest::of(1, 2), 7);

        let out = CollectionMaterializer::new(&store)
            .materialize_page(page, people)
            .unwrap();
        assert_eq!(ids(out.content()), vec![2, 1]);
        assert_eq!(out.total_elements(), 7);
        assert_eq!(out.request(), &PageRequest::of(1, 2));
    }

    #[test]
    fn test_existing_relations_are_kept() {
        let (model, store) = seeded();
        let people = model.relation("film", "people").unwrap();
        let mut parent = Row::new(1).with("title", "kept");
        parent.set_relation("episodes", vec![Row::new(50)]);

        let out = CollectionMaterializer::new(&store)
            .materialize_one(Some(parent), people)
            .unwrap()
            .unwrap();
        assert_eq!(out.get("title").as_text(), Some("kept"));
        assert!(out.is_loaded("episodes"));
        assert!(out.is_loaded("people"));
    }
}
