//! reeldb - criteria queries over a media catalog
//!
//! A criteria bundle of typed field filters is compiled against an entity
//! model into a specification, evaluated by a row store, and the matching
//! rows can have their to-many relations loaded in one extra query without
//! duplicating or reordering them.

pub mod cli;
pub mod compiler;
pub mod config;
pub mod errors;
pub mod filter;
pub mod materializer;
pub mod model;
pub mod observability;
pub mod request;
pub mod service;
pub mod store;
