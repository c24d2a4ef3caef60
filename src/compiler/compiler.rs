//! Criteria bundle to specification compiler
//!
//! Compilation is pure and deterministic: filters are visited in field-name
//! order, each resolved against the entity model, and every operator that
//! is set becomes one test. All tests are combined with AND.
//!
//! One routine exists per filter family (`Filter<T>`, `RangeFilter<T>`,
//! `StringFilter`); entity-specific knowledge lives only in the model.

use crate::filter::{
    Criteria, FieldFilter, Filter, RangeFilter, Scalar, ScalarType, StringFilter, Value,
};
use crate::model::{DomainModel, EntityModel, FilterTarget};

use super::errors::{CompileError, CompileResult};
use super::specification::{FieldPath, RangeOp, Specification, Test};

/// Compiles criteria bundles against a domain model
#[derive(Debug, Clone, Copy)]
pub struct SpecificationCompiler<'m> {
    model: &'m DomainModel,
}

impl<'m> SpecificationCompiler<'m> {
    pub fn new(model: &'m DomainModel) -> Self {
        Self { model }
    }

    /// Compiles `criteria` for `entity`.
    ///
    /// No criteria and an empty bundle both yield the identity specification.
    pub fn compile(
        &self,
        entity: &str,
        criteria: Option<&Criteria>,
    ) -> CompileResult<Specification> {
        let model = self.model.entity(entity)?;
        let mut spec = Specification::all(entity);
        let criteria = match criteria {
            Some(criteria) => criteria,
            None => return Ok(spec),
        };

        // Query shape first, independent of any field predicate
        spec = spec.distinct(criteria.distinct().unwrap_or(false));

        for (key, filter) in criteria.filters() {
            let (scalar, target) = resolve(model, key)?;
            check_kind(model, key, scalar, filter)?;

            let tests = build_tests(filter);
            if tests.is_empty() {
                continue;
            }
            let path = match target {
                FilterTarget::Attribute(field) => FieldPath::root(field.name.as_str()),
                FilterTarget::RelationId(link) => {
                    let join = spec.push_join(link.clone());
                    FieldPath::joined(join, link.related_identifier_field.as_str())
                }
            };
            for test in tests {
                spec.push_condition(path.clone(), test);
            }
        }
        Ok(spec)
    }
}

fn resolve<'e>(model: &'e EntityModel, key: &str) -> CompileResult<(ScalarType, FilterTarget<'e>)> {
    match model.resolve_filter(key) {
        Some(FilterTarget::Attribute(field)) => Ok((field.scalar, FilterTarget::Attribute(field))),
        // Related identifiers are always long; checked when the model is built
        Some(FilterTarget::RelationId(link)) => Ok((ScalarType::Long, FilterTarget::RelationId(link))),
        None => Err(CompileError::unknown_field(model.name(), key)),
    }
}

fn check_kind(
    model: &EntityModel,
    key: &str,
    scalar: ScalarType,
    filter: &FieldFilter,
) -> CompileResult<()> {
    if !scalar.accepts(filter.kind()) {
        return Err(CompileError::type_mismatch(
            model.name(),
            key,
            scalar.type_name(),
            filter.kind().as_str(),
        ));
    }
    if let (ScalarType::Enumeration(variants), FieldFilter::Enumeration(filter)) = (scalar, filter) {
        let operands = filter
            .equals
            .iter()
            .chain(filter.not_equals.iter())
            .chain(filter.in_list.iter().flatten())
            .chain(filter.not_in.iter().flatten());
        for operand in operands {
            if !variants.contains(&operand.as_str()) {
                return Err(CompileError::type_mismatch(
                    model.name(),
                    key,
                    &format!("one of [{}]", variants.join(", ")),
                    &format!("'{}'", operand),
                ));
            }
        }
    }
    Ok(())
}

fn build_tests(filter: &FieldFilter) -> Vec<Test> {
    let mut tests = Vec::new();
    match filter {
        FieldFilter::Long(f) => range_tests(f, &mut tests),
        FieldFilter::Integer(f) => range_tests(f, &mut tests),
        FieldFilter::Instant(f) => range_tests(f, &mut tests),
        FieldFilter::Text(f) => string_tests(f, &mut tests),
        FieldFilter::Enumeration(f) => base_tests(f, &mut tests),
        FieldFilter::Boolean(f) => base_tests(f, &mut tests),
    }
    tests
}

fn values<T: Scalar>(operands: &[T]) -> Vec<Value> {
    operands.iter().map(Scalar::to_value).collect()
}

fn base_tests<T: Scalar>(filter: &Filter<T>, tests: &mut Vec<Test>) {
    if let Some(v) = &filter.equals {
        tests.push(Test::Equals(v.to_value()));
    }
    if let Some(v) = &filter.not_equals {
        tests.push(Test::NotEquals(v.to_value()));
    }
    if let Some(vs) = &filter.in_list {
        tests.push(Test::In(values(vs)));
    }
    if let Some(vs) = &filter.not_in {
        tests.push(Test::NotIn(values(vs)));
    }
    if let Some(specified) = filter.specified {
        tests.push(Test::Specified(specified));
    }
}

fn range_tests<T: Scalar>(filter: &RangeFilter<T>, tests: &mut Vec<Test>) {
    base_tests(&filter.base, tests);
    let bounds = [
        (RangeOp::Gt, &filter.greater_than),
        (RangeOp::Gte, &filter.greater_than_or_equal),
        (RangeOp::Lt, &filter.less_than),
        (RangeOp::Lte, &filter.less_than_or_equal),
    ];
    for (op, bound) in bounds {
        if let Some(v) = bound {
            tests.push(Test::Range(op, v.to_value()));
        }
    }
}

fn string_tests(filter: &StringFilter, tests: &mut Vec<Test>) {
    base_tests(&filter.base, tests);
    if let Some(needle) = &filter.contains {
        tests.push(Test::Contains(needle.clone()));
    }
    if let Some(needle) = &filter.does_not_contain {
        tests.push(Test::NotContains(needle.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileErrorCode;
    use crate::filter::{IntegerFilter, LongFilter};
    use crate::model::catalog::{self, Gender, FILM};

    fn model() -> DomainModel {
        catalog::catalog_model().unwrap()
    }

    #[test]
    fn test_no_criteria_is_identity() {
        let model = model();
        let compiler = SpecificationCompiler::new(&model);

        let spec = compiler.compile(FILM, None).unwrap();
        assert!(spec.is_identity());
        assert!(!spec.is_distinct());

        let spec = compiler.compile(FILM, Some(&Criteria::new())).unwrap();
        assert!(spec.is_identity());
    }

    #[test]
    fn test_distinct_applied_without_predicates() {
        let model = model();
        let criteria = Criteria::new().with_distinct(true);
        let spec = SpecificationCompiler::new(&model)
            .compile(FILM, Some(&criteria))
            .unwrap();
        assert!(spec.is_distinct());
        assert!(spec.conditions().is_empty());
    }

    #[test]
    fn test_empty_filter_contributes_nothing() {
        let model = model();
        let criteria = Criteria::new()
            .with("views", IntegerFilter::new())
            .with("personId", LongFilter::new());
        let spec = SpecificationCompiler::new(&model)
            .compile(FILM, Some(&criteria))
            .unwrap();
        assert!(spec.is_identity());
    }

    #[test]
    fn test_every_operator_becomes_a_test() {
        let model = model();
        let criteria = Criteria::new().with(
            "views",
            IntegerFilter::new()
                .greater_than_or_equal(5)
                .less_than_or_equal(10)
                .not_equals(7),
        );
        let spec = SpecificationCompiler::new(&model)
            .compile(FILM, Some(&criteria))
            .unwrap();
        assert_eq!(spec.conditions().len(), 3);
        assert!(spec
            .conditions()
            .iter()
            .all(|c| c.path == FieldPath::root("views")));
    }

    #[test]
    fn test_relation_filter_adds_left_join() {
        let model = model();
        let criteria = Criteria::new().with("personId", LongFilter::new().equals(4));
        let spec = SpecificationCompiler::new(&model)
            .compile(FILM, Some(&criteria))
            .unwrap();

        assert_eq!(spec.joins().len(), 1);
        assert_eq!(spec.joins()[0].name, "people");
        assert_eq!(spec.conditions()[0].path, FieldPath::joined(0, "id"));
        assert_eq!(spec.conditions()[0].test, Test::Equals(Value::Int(4)));
    }

    #[test]
    fn test_unknown_field_is_fatal() {
        let model = model();
        let criteria = Criteria::new().with("budget", LongFilter::new().equals(1));
        let err = SpecificationCompiler::new(&model)
            .compile(FILM, Some(&criteria))
            .unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::ReelUnknownField);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unknown_entity_is_fatal() {
        let model = model();
        let err = SpecificationCompiler::new(&model)
            .compile("studio", None)
            .unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::ReelUnknownEntity);
    }

    #[test]
    fn test_kind_mismatch_is_fatal() {
        let model = model();
        let criteria = Criteria::new().with("title", LongFilter::new().equals(1));
        let err = SpecificationCompiler::new(&model)
            .compile(FILM, Some(&criteria))
            .unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::ReelFilterTypeMismatch);
    }

    #[test]
    fn test_enumeration_operands_checked() {
        let model = model();
        let compiler = SpecificationCompiler::new(&model);

        let ok = Criteria::new().with(
            "gender",
            FieldFilter::enumeration(Filter::new().equals(Gender::Scifi)),
        );
        let spec = compiler.compile(FILM, Some(&ok)).unwrap();
        assert_eq!(spec.conditions()[0].test, Test::Equals(Value::from("SCIFI")));

        let bad = Criteria::new().with(
            "gender",
            FieldFilter::Enumeration(Filter::new().equals("WESTERN".to_string())),
        );
        let err = compiler.compile(FILM, Some(&bad)).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::ReelFilterTypeMismatch);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let model = model();
        let criteria = Criteria::new()
            .with("views", IntegerFilter::new().less_than(100))
            .with("title", StringFilter::new().contains("Matrix"))
            .with("personId", LongFilter::new().in_list(vec![1, 2]));
        let compiler = SpecificationCompiler::new(&model);
        let first = compiler.compile(FILM, Some(&criteria)).unwrap();
        let second = compiler.compile(FILM, Some(&criteria.clone())).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }
}
