//! Query-facing service for one entity
//!
//! Composition only: compile the criteria, run the specification against
//! the store, and materialize relations when asked to. Every call logs a
//! trace event carrying the compiled specification.

use crate::compiler::{Specification, SpecificationCompiler};
use crate::filter::Criteria;
use crate::materializer::CollectionMaterializer;
use crate::model::{DomainModel, EntityModel, Page, PageRequest, Row};
use crate::observability::{log_event, Event};
use crate::store::RowStore;

use super::errors::{QueryError, QueryResult};

/// Page size ceiling when none is configured
pub const DEFAULT_MAX_PAGE_SIZE: usize = 2000;

/// Read-only queries over one entity of a store
#[derive(Debug)]
pub struct QueryService<'a, S: RowStore + ?Sized> {
    model: &'a DomainModel,
    entity: &'a EntityModel,
    store: &'a S,
    max_page_size: usize,
}

impl<'a, S: RowStore + ?Sized> QueryService<'a, S> {
    /// Fails when `entity` is not part of `model`
    pub fn new(model: &'a DomainModel, store: &'a S, entity: &str) -> QueryResult<Self> {
        Ok(Self {
            model,
            entity: model.entity(entity)?,
            store,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        })
    }

    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    pub fn entity(&self) -> &str {
        self.entity.name()
    }

    /// All rows matching `criteria`
    pub fn find_by_criteria(&self, criteria: Option<&Criteria>) -> QueryResult<Vec<Row>> {
        let spec = self.compile(criteria)?;
        let rows = self.store.find(&spec, None)?;

        let count = rows.len().to_string();
        log_event(
            Event::QueryFind,
            &[("entity", self.entity()), ("rows", count.as_str())],
        );
        Ok(rows)
    }

    /// One page of rows matching `criteria`.
    ///
    /// The total comes from a count over the same specification. Page sizes
    /// above the configured maximum are clamped; a zero size is rejected.
    pub fn find_page_by_criteria(
        &self,
        criteria: Option<&Criteria>,
        page: &PageRequest,
    ) -> QueryResult<Page<Row>> {
        let spec = self.compile(criteria)?;
        let request = self.clamp(page)?;
        let rows = self.store.find(&spec, Some(&request))?;
        let total = self.store.count(&spec)?;

        let request_str = request.to_string();
        let count = rows.len().to_string();
        let total_str = total.to_string();
        log_event(
            Event::QueryFindPage,
            &[
                ("entity", self.entity()),
                ("page", request_str.as_str()),
                ("rows", count.as_str()),
                ("total", total_str.as_str()),
            ],
        );
        Ok(Page::new(rows, request, total))
    }

    /// Number of rows `find_by_criteria` would return
    pub fn count_by_criteria(&self, criteria: Option<&Criteria>) -> QueryResult<u64> {
        let spec = self.compile(criteria)?;
        let count = self.store.count(&spec)?;

        let count_str = count.to_string();
        log_event(
            Event::QueryCount,
            &[("count", count_str.as_str()), ("entity", self.entity())],
        );
        Ok(count)
    }

    /// Loads the named relation onto `parents`, keeping their order
    pub fn materialize_relation(&self, parents: Vec<Row>, relation: &str) -> QueryResult<Vec<Row>> {
        let link = self.model.relation(self.entity(), relation)?;
        Ok(CollectionMaterializer::new(self.store).materialize(parents, link)?)
    }

    /// Loads every eager relation declared on the entity.
    ///
    /// `rows` must not repeat an id; rows found through a to-many filter
    /// need `distinct` set first.
    pub fn materialize_eager(&self, mut rows: Vec<Row>) -> QueryResult<Vec<Row>> {
        let materializer = CollectionMaterializer::new(self.store);
        for link in self.entity.eager_relations() {
            rows = materializer.materialize(rows, link)?;
        }
        Ok(rows)
    }

    /// One row by id with its eager relations loaded
    pub fn find_one_eager(&self, id: i64) -> QueryResult<Option<Row>> {
        let mut row = self.store.find_by_id(self.entity(), id)?;
        let materializer = CollectionMaterializer::new(self.store);
        for link in self.entity.eager_relations() {
            row = materializer.materialize_one(row, link)?;
        }
        Ok(row)
    }

    /// One unfiltered page with eager relations loaded on its content
    pub fn find_page_eager(&self, page: &PageRequest) -> QueryResult<Page<Row>> {
        let page = self.find_page_by_criteria(None, page)?;
        let (content, request, total) = page.into_parts();
        Ok(Page::new(self.materialize_eager(content)?, request, total))
    }

    fn compile(&self, criteria: Option<&Criteria>) -> QueryResult<Specification> {
        let spec = SpecificationCompiler::new(self.model).compile(self.entity(), criteria)?;

        let criteria_str = criteria.map(Criteria::to_string).unwrap_or_default();
        let spec_str = spec.to_string();
        log_event(
            Event::CriteriaCompiled,
            &[
                ("criteria", criteria_str.as_str()),
                ("entity", self.entity()),
                ("specification", spec_str.as_str()),
            ],
        );
        Ok(spec)
    }

    fn clamp(&self, page: &PageRequest) -> QueryResult<PageRequest> {
        if page.size == 0 {
            return Err(QueryError::InvalidPage("size must be > 0".into()));
        }
        let mut request = page.clone();
        request.size = request.size.min(self.max_page_size);
        Ok(request)
    }
}
