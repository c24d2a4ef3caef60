//! Query-facing service
//!
//! Thin composition of compiler, store and materializer for one entity.

mod errors;
mod query;

pub use errors::{QueryError, QueryResult};
pub use query::{QueryService, DEFAULT_MAX_PAGE_SIZE};
