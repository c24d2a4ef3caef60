//! Collection materializer
//!
//! Eager-loads a to-many relation for an ordered batch of parents in one
//! extra store query, without duplicating or reordering the parents.
//!
//! Many-to-one links go through the same path; each parent then carries a
//! list of at most one row.

mod errors;
#[allow(clippy::module_inception)]
mod materializer;

pub use errors::{MaterializeError, MaterializeErrorCode, MaterializeResult};
pub use materializer::CollectionMaterializer;
