//! Filter primitives and criteria bundles
//!
//! Filters are constructed per query and never persisted. They carry no
//! knowledge of entities; field names are resolved by the compiler.

mod criteria;
mod primitive;
mod value;

pub use criteria::Criteria;
pub use primitive::{
    BooleanFilter, FieldFilter, Filter, InstantFilter, IntegerFilter, LongFilter, RangeFilter,
    StringFilter,
};
pub use value::{EnumScalar, FilterKind, Scalar, ScalarType, Value};
