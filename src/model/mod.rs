//! Entity metadata, rows and pages
//!
//! The store, compiler and materializer all read entity structure from a
//! `DomainModel`. Rows are plain value maps keyed by column name.

pub mod catalog;
mod entity;
mod page;
mod row;

pub use catalog::{catalog_model, FilmType, Gender};
pub use entity::{
    DomainModel, DomainModelBuilder, EntityModel, FieldDef, FilterTarget, JoinColumn, JoinKind,
    RelationLink, IDENTIFIER,
};
pub use page::{Page, PageRequest, SortDirection, SortOrder};
pub use row::Row;
