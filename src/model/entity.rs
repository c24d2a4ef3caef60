//! Entity metadata
//!
//! The domain model is an explicit, immutable value built once at process
//! start and passed by reference to the compiler, store and materializer.
//! Building it validates every relation link, so a misconfigured link fails
//! at startup instead of on the first query that touches it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::compiler::{CompileError, CompileResult};
use crate::filter::ScalarType;

/// Name of the identifier field every entity carries
pub const IDENTIFIER: &str = "id";

/// Cardinality of a relation, seen from its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    OneToMany,
    ManyToMany,
    ManyToOne,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::OneToMany => "one-to-many",
            JoinKind::ManyToMany => "many-to-many",
            JoinKind::ManyToOne => "many-to-one",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the store finds the pairs of a relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinColumn {
    /// Column on the owner holding the related identifier (many-to-one)
    ForeignKey(String),
    /// Column on the related entity holding the owner identifier (one-to-many)
    MappedBy(String),
    /// Link table of identifier pairs (many-to-many)
    JoinTable {
        table: String,
        owner_column: String,
        related_column: String,
    },
}

/// A navigable relation from one entity to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationLink {
    pub name: String,
    pub owner_entity: String,
    pub related_entity: String,
    pub join_kind: JoinKind,
    pub related_identifier_field: String,
    pub join_column: JoinColumn,
}

impl RelationLink {
    pub fn many_to_one(
        owner: impl Into<String>,
        name: impl Into<String>,
        related: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            owner_entity: owner.into(),
            related_entity: related.into(),
            join_kind: JoinKind::ManyToOne,
            related_identifier_field: IDENTIFIER.to_string(),
            join_column: JoinColumn::ForeignKey(foreign_key.into()),
        }
    }

    pub fn one_to_many(
        owner: impl Into<String>,
        name: impl Into<String>,
        related: impl Into<String>,
        mapped_by: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            owner_entity: owner.into(),
            related_entity: related.into(),
            join_kind: JoinKind::OneToMany,
            related_identifier_field: IDENTIFIER.to_string(),
            join_column: JoinColumn::MappedBy(mapped_by.into()),
        }
    }

    pub fn many_to_many(
        owner: impl Into<String>,
        name: impl Into<String>,
        related: impl Into<String>,
        table: impl Into<String>,
        owner_column: impl Into<String>,
        related_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            owner_entity: owner.into(),
            related_entity: related.into(),
            join_kind: JoinKind::ManyToMany,
            related_identifier_field: IDENTIFIER.to_string(),
            join_column: JoinColumn::JoinTable {
                table: table.into(),
                owner_column: owner_column.into(),
                related_column: related_column.into(),
            },
        }
    }

    /// Qualified name, e.g. `film.people`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.owner_entity, self.name)
    }
}

/// A declared scalar column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub scalar: ScalarType,
    pub nullable: bool,
}

/// What a criteria key refers to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterTarget<'a> {
    Attribute(&'a FieldDef),
    /// Identifier of the rows reached through a relation
    RelationId(&'a RelationLink),
}

/// Metadata for one entity
#[derive(Debug, Clone)]
pub struct EntityModel {
    name: String,
    fields: Vec<FieldDef>,
    relations: Vec<RelationLink>,
    relation_filters: BTreeMap<String, String>,
    eager: Vec<String>,
}

impl EntityModel {
    /// Creates a model holding only the identifier field
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: vec![FieldDef {
                name: IDENTIFIER.to_string(),
                scalar: ScalarType::Long,
                nullable: false,
            }],
            relations: Vec::new(),
            relation_filters: BTreeMap::new(),
            eager: Vec::new(),
        }
    }

    /// Adds a nullable field
    pub fn field(mut self, name: impl Into<String>, scalar: ScalarType) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            scalar,
            nullable: true,
        });
        self
    }

    /// Adds a non-null field
    pub fn required_field(mut self, name: impl Into<String>, scalar: ScalarType) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            scalar,
            nullable: false,
        });
        self
    }

    pub fn many_to_one(
        mut self,
        name: impl Into<String>,
        related: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        let link = RelationLink::many_to_one(self.name.clone(), name, related, foreign_key);
        self.relations.push(link);
        self
    }

    pub fn one_to_many(
        mut self,
        name: impl Into<String>,
        related: impl Into<String>,
        mapped_by: impl Into<String>,
    ) -> Self {
        let link = RelationLink::one_to_many(self.name.clone(), name, related, mapped_by);
        self.relations.push(link);
        self
    }

    pub fn many_to_many(
        mut self,
        name: impl Into<String>,
        related: impl Into<String>,
        table: impl Into<String>,
        owner_column: impl Into<String>,
        related_column: impl Into<String>,
    ) -> Self {
        let link = RelationLink::many_to_many(
            self.name.clone(),
            name,
            related,
            table,
            owner_column,
            related_column,
        );
        self.relations.push(link);
        self
    }

    /// Exposes `key` as a filter on the identifier of `relation`'s rows
    pub fn relation_filter(mut self, key: impl Into<String>, relation: impl Into<String>) -> Self {
        self.relation_filters.insert(key.into(), relation.into());
        self
    }

    /// Marks `relation` for eager loading
    pub fn eager(mut self, relation: impl Into<String>) -> Self {
        self.eager.push(relation.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn relations(&self) -> &[RelationLink] {
        &self.relations
    }

    pub fn relation(&self, name: &str) -> Option<&RelationLink> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Resolves a criteria key to an attribute or a relation identifier
    pub fn resolve_filter(&self, key: &str) -> Option<FilterTarget<'_>> {
        if let Some(field) = self.field_def(key) {
            return Some(FilterTarget::Attribute(field));
        }
        self.relation_filters
            .get(key)
            .and_then(|relation| self.relation(relation))
            .map(FilterTarget::RelationId)
    }

    /// Relations loaded by the eager finders, in declaration order
    pub fn eager_relations(&self) -> impl Iterator<Item = &RelationLink> {
        self.eager.iter().filter_map(move |name| self.relation(name))
    }
}

/// Immutable registry of entity models
#[derive(Debug, Clone)]
pub struct DomainModel {
    entities: BTreeMap<String, EntityModel>,
}

impl DomainModel {
    pub fn builder() -> DomainModelBuilder {
        DomainModelBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&EntityModel> {
        self.entities.get(name)
    }

    pub fn entity(&self, name: &str) -> CompileResult<&EntityModel> {
        self.get(name)
            .ok_or_else(|| CompileError::unknown_entity(name))
    }

    pub fn relation(&self, entity: &str, relation: &str) -> CompileResult<&RelationLink> {
        self.entity(entity)?.relation(relation).ok_or_else(|| {
            CompileError::relation_misconfigured(entity, relation, "no such relation")
        })
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityModel> {
        self.entities.values()
    }
}

/// Collects entity models and validates them as a whole
#[derive(Debug, Default)]
pub struct DomainModelBuilder {
    entities: Vec<EntityModel>,
}

impl DomainModelBuilder {
    pub fn entity(mut self, entity: EntityModel) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn build(self) -> CompileResult<DomainModel> {
        let mut entities = BTreeMap::new();
        for entity in self.entities {
            check_unique_members(&entity)?;
            let name = entity.name.clone();
            if entities.insert(name.clone(), entity).is_some() {
                return Err(CompileError::duplicate(name, "entity"));
            }
        }

        let model = DomainModel { entities };
        for entity in model.entities.values() {
            for link in &entity.relations {
                validate_link(&model, entity, link)?;
            }
            for (key, relation) in &entity.relation_filters {
                if entity.field_def(key).is_some() {
                    return Err(CompileError::duplicate(entity.name.as_str(), key));
                }
                if entity.relation(relation).is_none() {
                    return Err(CompileError::relation_misconfigured(
                        entity.name.as_str(),
                        relation,
                        format!("filter key '{}' targets an undeclared relation", key),
                    ));
                }
            }
            for relation in &entity.eager {
                if entity.relation(relation).is_none() {
                    return Err(CompileError::relation_misconfigured(
                        entity.name.as_str(),
                        relation,
                        "marked eager but not declared",
                    ));
                }
            }
        }
        Ok(model)
    }
}

fn check_unique_members(entity: &EntityModel) -> CompileResult<()> {
    let mut seen = BTreeSet::new();
    for field in &entity.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(CompileError::duplicate(entity.name.as_str(), &field.name));
        }
    }
    let mut seen = BTreeSet::new();
    for link in &entity.relations {
        if !seen.insert(link.name.as_str()) {
            return Err(CompileError::duplicate(entity.name.as_str(), &link.name));
        }
    }
    Ok(())
}

fn validate_link(model: &DomainModel, owner: &EntityModel, link: &RelationLink) -> CompileResult<()> {
    let fail = |reason: String| {
        Err(CompileError::relation_misconfigured(
            owner.name.as_str(),
            &link.name,
            reason,
        ))
    };

    if link.owner_entity != owner.name {
        return fail(format!("declared owner is '{}'", link.owner_entity));
    }
    let related = match model.get(&link.related_entity) {
        Some(related) => related,
        None => return fail(format!("unknown related entity '{}'", link.related_entity)),
    };
    match related.field_def(&link.related_identifier_field) {
        Some(field) if field.scalar == ScalarType::Long => {}
        _ => {
            return fail(format!(
                "'{}.{}' is not a long identifier",
                related.name, link.related_identifier_field
            ))
        }
    }

    match (&link.join_kind, &link.join_column) {
        (JoinKind::ManyToOne, JoinColumn::ForeignKey(column)) => {
            require_long_column(owner, column).or_else(|reason| fail(reason))
        }
        (JoinKind::OneToMany, JoinColumn::MappedBy(column)) => {
            require_long_column(related, column).or_else(|reason| fail(reason))
        }
        (JoinKind::ManyToMany, JoinColumn::JoinTable { owner_column, related_column, .. }) => {
            if owner_column == related_column {
                fail("join table columns must differ".to_string())
            } else {
                Ok(())
            }
        }
        (kind, column) => fail(format!("{} relation cannot use {:?}", kind, column)),
    }
}

fn require_long_column(entity: &EntityModel, column: &str) -> Result<(), String> {
    match entity.field_def(column) {
        Some(field) if field.scalar == ScalarType::Long => Ok(()),
        Some(field) => Err(format!(
            "column '{}.{}' is {}, expected long",
            entity.name,
            column,
            field.scalar.type_name()
        )),
        None => Err(format!("column '{}.{}' is not declared", entity.name, column)),
    }
}
