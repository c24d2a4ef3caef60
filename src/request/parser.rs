//! # Query Parameter Parser
//!
//! Parses request parameters into a criteria bundle and an optional page.
//!
//! Filter parameters are `field.operator=value`:
//!
//! | operator | families |
//! |---|---|
//! | `equals`, `notEquals`, `specified` | all |
//! | `in`, `notIn` (comma-separated) | all |
//! | `greaterThan`, `greaterThanOrEqual`, `lessThan`, `lessThanOrEqual` | long, integer, instant |
//! | `contains`, `doesNotContain` | text |
//!
//! Paging keys are `page`, `size` and `sort=field[,asc|desc]` (repeatable).
//! `distinct=true|false` sets the distinct flag.

use crate::filter::{
    Criteria, FieldFilter, Filter, RangeFilter, Scalar, ScalarType, StringFilter,
};
use crate::model::{DomainModel, EntityModel, FilterTarget, PageRequest, SortOrder};

use super::errors::{RequestError, RequestResult};

/// Page size used when a request pages without giving a size
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Parsed request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    pub criteria: Criteria,
    /// None when the request sets no paging key
    pub page: Option<PageRequest>,
}

/// Parses request parameters against an entity's model
#[derive(Debug, Clone, Copy)]
pub struct RequestParser<'m> {
    model: &'m DomainModel,
    default_page_size: usize,
}

impl<'m> RequestParser<'m> {
    pub fn new(model: &'m DomainModel) -> Self {
        Self {
            model,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    pub fn parse(&self, entity: &str, params: &[(String, String)]) -> RequestResult<RequestParams> {
        let entity = self.model.entity(entity)?;
        let mut criteria = Criteria::new();
        let mut page: Option<usize> = None;
        let mut size: Option<usize> = None;
        let mut sort = Vec::new();

        for (key, value) in params {
            match key.as_str() {
                "distinct" => {
                    let distinct =
                        bool::parse_param(value).map_err(|reason| invalid(key, reason))?;
                    criteria.set_distinct(Some(distinct));
                }
                "page" => page = Some(parse_index(key, value)?),
                "size" => {
                    let parsed = parse_index(key, value)?;
                    if parsed == 0 {
                        return Err(RequestError::InvalidPaging(
                            "size must be positive".to_string(),
                        ));
                    }
                    size = Some(parsed);
                }
                "sort" => sort.push(parse_sort(entity, value)?),
                _ => parse_filter(entity, &mut criteria, key, value)?,
            }
        }

        let page = if page.is_some() || size.is_some() || !sort.is_empty() {
            Some(PageRequest {
                page: page.unwrap_or(0),
                size: size.unwrap_or(self.default_page_size),
                sort,
            })
        } else {
            None
        };
        Ok(RequestParams { criteria, page })
    }
}

fn invalid(param: &str, reason: String) -> RequestError {
    RequestError::InvalidValue {
        param: param.to_string(),
        reason,
    }
}

fn parse_index(key: &str, value: &str) -> RequestResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| {
            RequestError::InvalidPaging(format!(
                "{} must be a non-negative integer, got '{}'",
                key, value
            ))
        })
}

fn parse_sort(entity: &EntityModel, value: &str) -> RequestResult<SortOrder> {
    let mut parts = value.split(',').map(str::trim);
    let field = parts.next().unwrap_or_default();
    if entity.field_def(field).is_none() {
        return Err(RequestError::UnknownSortField(field.to_string()));
    }
    let order = match parts.next().map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") => SortOrder::asc(field),
        Some("desc") => SortOrder::desc(field),
        Some(other) => {
            return Err(RequestError::InvalidPaging(format!(
                "invalid sort direction '{}'",
                other
            )))
        }
    };
    if parts.next().is_some() {
        return Err(RequestError::InvalidPaging(format!("invalid sort '{}'", value)));
    }
    Ok(order)
}

fn parse_filter(
    entity: &EntityModel,
    criteria: &mut Criteria,
    key: &str,
    value: &str,
) -> RequestResult<()> {
    let (field, operator) = key
        .rsplit_once('.')
        .ok_or_else(|| RequestError::InvalidParam(key.to_string()))?;

    let scalar = match entity.resolve_filter(field) {
        Some(FilterTarget::Attribute(def)) => def.scalar,
        Some(FilterTarget::RelationId(_)) => ScalarType::Long,
        None => {
            return Err(RequestError::UnknownField {
                entity: entity.name().to_string(),
                field: field.to_string(),
            })
        }
    };

    let filter = criteria.entry_or_insert(field, FieldFilter::empty(scalar.filter_kind()));
    let applied = match filter {
        FieldFilter::Long(f) => apply_range(f, operator, value),
        FieldFilter::Integer(f) => apply_range(f, operator, value),
        FieldFilter::Instant(f) => apply_range(f, operator, value),
        FieldFilter::Text(f) => apply_string(f, operator, value),
        FieldFilter::Boolean(f) => apply_base(f, operator, value),
        FieldFilter::Enumeration(f) => {
            let applied = apply_base(f, operator, value);
            if let ScalarType::Enumeration(variants) = scalar {
                check_variants(f, variants).map_err(|reason| invalid(key, reason))?;
            }
            applied
        }
    };

    match applied {
        Ok(true) => Ok(()),
        Ok(false) => Err(RequestError::UnsupportedOperator {
            field: field.to_string(),
            operator: operator.to_string(),
            kind: scalar.type_name().to_string(),
        }),
        Err(reason) => Err(invalid(key, reason)),
    }
}

fn parse_list<T: Scalar>(raw: &str) -> Result<Vec<T>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(T::parse_param)
        .collect()
}

/// Applies a base operator; Ok(false) if the operator is not a base operator
fn apply_base<T: Scalar>(
    filter: &mut Filter<T>,
    operator: &str,
    raw: &str,
) -> Result<bool, String> {
    match operator {
        "equals" => filter.equals = Some(T::parse_param(raw)?),
        "notEquals" => filter.not_equals = Some(T::parse_param(raw)?),
        "in" => filter.in_list = Some(parse_list(raw)?),
        "notIn" => filter.not_in = Some(parse_list(raw)?),
        "specified" => filter.specified = Some(bool::parse_param(raw)?),
        _ => return Ok(false),
    }
    Ok(true)
}

fn apply_range<T: Scalar>(
    filter: &mut RangeFilter<T>,
    operator: &str,
    raw: &str,
) -> Result<bool, String> {
    if apply_base(&mut filter.base, operator, raw)? {
        return Ok(true);
    }
    let slot = match operator {
        "greaterThan" => &mut filter.greater_than,
        "greaterThanOrEqual" => &mut filter.greater_than_or_equal,
        "lessThan" => &mut filter.less_than,
        "lessThanOrEqual" => &mut filter.less_than_or_equal,
        _ => return Ok(false),
    };
    *slot = Some(T::parse_param(raw)?);
    Ok(true)
}

fn apply_string(filter: &mut StringFilter, operator: &str, raw: &str) -> Result<bool, String> {
    if apply_base(&mut filter.base, operator, raw)? {
        return Ok(true);
    }
    match operator {
        "contains" => filter.contains = Some(raw.to_string()),
        "doesNotContain" => filter.does_not_contain = Some(raw.to_string()),
        _ => return Ok(false),
    }
    Ok(true)
}

fn check_variants(filter: &Filter<String>, variants: &[&str]) -> Result<(), String> {
    let operands = filter
        .equals
        .iter()
        .chain(filter.not_equals.iter())
        .chain(filter.in_list.iter().flatten())
        .chain(filter.not_in.iter().flatten());
    for operand in operands {
        if !variants.contains(&operand.as_str()) {
            return Err(format!(
                "'{}' is not one of {}",
                operand,
                variants.join(", ")
            ));
        }
    }
    Ok(())
}
