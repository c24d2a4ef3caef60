//! Filter primitives
//!
//! One primitive holds the requested operators for one field. The family of
//! the primitive decides which operators exist at all:
//!
//! - `Filter<T>`: equals, notEquals, in, notIn, specified
//! - `RangeFilter<T>`: the above plus greaterThan(OrEqual), lessThan(OrEqual)
//! - `StringFilter`: the above (without ranges) plus contains, doesNotContain
//!
//! `FieldFilter` erases the operand type so a criteria bundle can hold
//! filters for fields of different types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value::{EnumScalar, FilterKind};

/// Equality, membership and null-check operators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filter<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equals: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_equals: Option<T>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub in_list: Option<Vec<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_in: Option<Vec<T>>,
    /// true: field is non-null, false: field is null
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specified: Option<bool>,
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self {
            equals: None,
            not_equals: None,
            in_list: None,
            not_in: None,
            specified: None,
        }
    }
}

impl<T> Filter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(mut self, value: T) -> Self {
        self.equals = Some(value);
        self
    }

    pub fn not_equals(mut self, value: T) -> Self {
        self.not_equals = Some(value);
        self
    }

    pub fn in_list(mut self, values: Vec<T>) -> Self {
        self.in_list = Some(values);
        self
    }

    pub fn not_in(mut self, values: Vec<T>) -> Self {
        self.not_in = Some(values);
        self
    }

    pub fn specified(mut self, specified: bool) -> Self {
        self.specified = Some(specified);
        self
    }

    /// True when no operator is set; such a filter constrains nothing
    pub fn is_empty(&self) -> bool {
        self.equals.is_none()
            && self.not_equals.is_none()
            && self.in_list.is_none()
            && self.not_in.is_none()
            && self.specified.is_none()
    }

    /// Applies `f` to every operand, keeping the operator layout
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Filter<U> {
        Filter {
            equals: self.equals.map(&mut f),
            not_equals: self.not_equals.map(&mut f),
            in_list: self
                .in_list
                .map(|values| values.into_iter().map(&mut f).collect()),
            not_in: self
                .not_in
                .map(|values| values.into_iter().map(&mut f).collect()),
            specified: self.specified,
        }
    }
}

impl<T: fmt::Debug> Filter<T> {
    fn describe(&self, parts: &mut Vec<String>) {
        if let Some(v) = &self.equals {
            parts.push(format!("equals={:?}", v));
        }
        if let Some(v) = &self.not_equals {
            parts.push(format!("notEquals={:?}", v));
        }
        if let Some(v) = &self.in_list {
            parts.push(format!("in={:?}", v));
        }
        if let Some(v) = &self.not_in {
            parts.push(format!("notIn={:?}", v));
        }
        if let Some(v) = &self.specified {
            parts.push(format!("specified={}", v));
        }
    }
}

impl<T: fmt::Debug> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        self.describe(&mut parts);
        write!(f, "[{}]", parts.join(", "))
    }
}

macro_rules! delegate_base_operators {
    ($t:ty) => {
        pub fn equals(mut self, value: $t) -> Self {
            self.base.equals = Some(value);
            self
        }

        pub fn not_equals(mut self, value: $t) -> Self {
            self.base.not_equals = Some(value);
            self
        }

        pub fn in_list(mut self, values: Vec<$t>) -> Self {
            self.base.in_list = Some(values);
            self
        }

        pub fn not_in(mut self, values: Vec<$t>) -> Self {
            self.base.not_in = Some(values);
            self
        }

        pub fn specified(mut self, specified: bool) -> Self {
            self.base.specified = Some(specified);
            self
        }
    };
}

/// Filter for ordered scalars (integers, instants)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RangeFilter<T> {
    #[serde(flatten)]
    pub base: Filter<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greater_than: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greater_than_or_equal: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub less_than: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub less_than_or_equal: Option<T>,
}

impl<T> Default for RangeFilter<T> {
    fn default() -> Self {
        Self {
            base: Filter::default(),
            greater_than: None,
            greater_than_or_equal: None,
            less_than: None,
            less_than_or_equal: None,
        }
    }
}

impl<T> RangeFilter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    delegate_base_operators!(T);

    pub fn greater_than(mut self, value: T) -> Self {
        self.greater_than = Some(value);
        self
    }

    pub fn greater_than_or_equal(mut self, value: T) -> Self {
        self.greater_than_or_equal = Some(value);
        self
    }

    pub fn less_than(mut self, value: T) -> Self {
        self.less_than = Some(value);
        self
    }

    pub fn less_than_or_equal(mut self, value: T) -> Self {
        self.less_than_or_equal = Some(value);
        self
    }

    /// Inclusive range `[low, high]`
    pub fn between(self, low: T, high: T) -> Self {
        self.greater_than_or_equal(low).less_than_or_equal(high)
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
            && self.greater_than.is_none()
            && self.greater_than_or_equal.is_none()
            && self.less_than.is_none()
            && self.less_than_or_equal.is_none()
    }
}

impl<T: fmt::Debug> fmt::Display for RangeFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        self.base.describe(&mut parts);
        if let Some(v) = &self.greater_than {
            parts.push(format!("greaterThan={:?}", v));
        }
        if let Some(v) = &self.greater_than_or_equal {
            parts.push(format!("greaterThanOrEqual={:?}", v));
        }
        if let Some(v) = &self.less_than {
            parts.push(format!("lessThan={:?}", v));
        }
        if let Some(v) = &self.less_than_or_equal {
            parts.push(format!("lessThanOrEqual={:?}", v));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Filter for text columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StringFilter {
    #[serde(flatten)]
    pub base: Filter<String>,
    /// Case-sensitive substring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub does_not_contain: Option<String>,
}

impl StringFilter {
    pub fn new() -> Self {
        Self::default()
    }

    delegate_base_operators!(String);

    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.contains = Some(needle.into());
        self
    }

    pub fn does_not_contain(mut self, needle: impl Into<String>) -> Self {
        self.does_not_contain = Some(needle.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.contains.is_none() && self.does_not_contain.is_none()
    }
}

impl fmt::Display for StringFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        self.base.describe(&mut parts);
        if let Some(v) = &self.contains {
            parts.push(format!("contains={:?}", v));
        }
        if let Some(v) = &self.does_not_contain {
            parts.push(format!("doesNotContain={:?}", v));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

pub type LongFilter = RangeFilter<i64>;
pub type IntegerFilter = RangeFilter<i32>;
pub type InstantFilter = RangeFilter<DateTime<Utc>>;
pub type BooleanFilter = Filter<bool>;

/// A filter primitive with its operand type erased
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldFilter {
    Long(LongFilter),
    Integer(IntegerFilter),
    Instant(InstantFilter),
    Text(StringFilter),
    /// Operands are variant names
    Enumeration(Filter<String>),
    Boolean(BooleanFilter),
}

impl FieldFilter {
    /// Builds an enumeration filter from a typed enum filter
    pub fn enumeration<E: EnumScalar>(filter: Filter<E>) -> Self {
        FieldFilter::Enumeration(filter.map(|e| e.name().to_string()))
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            FieldFilter::Long(_) => FilterKind::Long,
            FieldFilter::Integer(_) => FilterKind::Integer,
            FieldFilter::Instant(_) => FilterKind::Instant,
            FieldFilter::Text(_) => FilterKind::Text,
            FieldFilter::Enumeration(_) => FilterKind::Enumeration,
            FieldFilter::Boolean(_) => FilterKind::Boolean,
        }
    }

    /// An empty filter of the given kind
    pub fn empty(kind: FilterKind) -> Self {
        match kind {
            FilterKind::Long => FieldFilter::Long(RangeFilter::new()),
            FilterKind::Integer => FieldFilter::Integer(RangeFilter::new()),
            FilterKind::Instant => FieldFilter::Instant(RangeFilter::new()),
            FilterKind::Text => FieldFilter::Text(StringFilter::new()),
            FilterKind::Enumeration => FieldFilter::Enumeration(Filter::new()),
            FilterKind::Boolean => FieldFilter::Boolean(Filter::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldFilter::Long(f) => f.is_empty(),
            FieldFilter::Integer(f) => f.is_empty(),
            FieldFilter::Instant(f) => f.is_empty(),
            FieldFilter::Text(f) => f.is_empty(),
            FieldFilter::Enumeration(f) => f.is_empty(),
            FieldFilter::Boolean(f) => f.is_empty(),
        }
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFilter::Long(inner) => write!(f, "LongFilter {}", inner),
            FieldFilter::Integer(inner) => write!(f, "IntegerFilter {}", inner),
            FieldFilter::Instant(inner) => write!(f, "InstantFilter {}", inner),
            FieldFilter::Text(inner) => write!(f, "StringFilter {}", inner),
            FieldFilter::Enumeration(inner) => write!(f, "EnumFilter {}", inner),
            FieldFilter::Boolean(inner) => write!(f, "BooleanFilter {}", inner),
        }
    }
}

impl From<LongFilter> for FieldFilter {
    fn from(f: LongFilter) -> Self {
        FieldFilter::Long(f)
    }
}

impl From<IntegerFilter> for FieldFilter {
    fn from(f: IntegerFilter) -> Self {
        FieldFilter::Integer(f)
    }
}

impl From<InstantFilter> for FieldFilter {
    fn from(f: InstantFilter) -> Self {
        FieldFilter::Instant(f)
    }
}

impl From<StringFilter> for FieldFilter {
    fn from(f: StringFilter) -> Self {
        FieldFilter::Text(f)
    }
}

impl From<BooleanFilter> for FieldFilter {
    fn from(f: BooleanFilter) -> Self {
        FieldFilter::Boolean(f)
    }
}
