//! # Row Store
//!
//! The store evaluates compiled specifications. `find` and `count` take the
//! same `Specification`, so a count always agrees with an unpaged find.
//! `fetch_with_relation` is the single query the materializer issues per
//! batch of parents.

mod dataset;
mod errors;
mod evaluate;
mod memory;
mod sorter;

pub use dataset::{load_dataset, Dataset, LinkRecord};
pub use errors::{StoreError, StoreResult};
pub use evaluate::ConditionEvaluator;
pub use memory::MemoryStore;
pub use sorter::RowSorter;

use crate::compiler::Specification;
use crate::model::{PageRequest, RelationLink, Row};

/// Backend trait for row storage
pub trait RowStore: Send + Sync + std::fmt::Debug {
    /// Rows matching `spec`; sorted and sliced when a page is given
    fn find(&self, spec: &Specification, page: Option<&PageRequest>) -> StoreResult<Vec<Row>>;

    /// Number of rows an unpaged `find` with `spec` returns
    fn count(&self, spec: &Specification) -> StoreResult<u64>;

    /// Distinct `entity` rows with the given ids, each with `link` loaded.
    ///
    /// Ids with no row are left out. Order is unspecified.
    fn fetch_with_relation(
        &self,
        entity: &str,
        ids: &[i64],
        link: &RelationLink,
    ) -> StoreResult<Vec<Row>>;

    fn find_by_id(&self, entity: &str, id: i64) -> StoreResult<Option<Row>>;
}
