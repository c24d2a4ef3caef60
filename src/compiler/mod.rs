//! Specification compiler
//!
//! Turns a criteria bundle into a `Specification` for one entity. The
//! compiler is pure; it reads the domain model and never touches the store.

#[allow(clippy::module_inception)]
mod compiler;
mod errors;
mod specification;

pub use compiler::SpecificationCompiler;
pub use errors::{CompileError, CompileErrorCode, CompileResult};
pub use specification::{Condition, FieldPath, RangeOp, Specification, Test};
