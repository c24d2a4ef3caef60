//! Request parameter parsing
//!
//! Turns `field.operator=value` parameters into a typed criteria bundle.
//! Everything a caller can get wrong is caught here as a user-input error,
//! so a bundle that reaches the compiler is well-formed.

mod errors;
mod parser;

pub use errors::{RequestError, RequestResult};
pub use parser::{RequestParams, RequestParser, DEFAULT_PAGE_SIZE};
