//! The media catalog: films, their episodes and the people in them

use crate::compiler::CompileResult;
use crate::filter::{EnumScalar, ScalarType};

use super::entity::{DomainModel, EntityModel};

pub const FILM: &str = "film";
pub const EPISODE: &str = "episode";
pub const PERSON: &str = "person";

/// Join table between films and people
pub const FILM_PERSON_TABLE: &str = "rel_film__person";

/// Film genre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Comedy,
    Drama,
    Adventure,
    Action,
    Crime,
    Thriller,
    Romance,
    Documentary,
    Animated,
    Fantasy,
    Musicals,
    Scifi,
    Horror,
}

impl EnumScalar for Gender {
    const VARIANTS: &'static [&'static str] = &[
        "COMEDY",
        "DRAMA",
        "ADVENTURE",
        "ACTION",
        "CRIME",
        "THRILLER",
        "ROMANCE",
        "DOCUMENTARY",
        "ANIMATED",
        "FANTASY",
        "MUSICALS",
        "SCIFI",
        "HORROR",
    ];

    fn name(&self) -> &'static str {
        match self {
            Gender::Comedy => "COMEDY",
            Gender::Drama => "DRAMA",
            Gender::Adventure => "ADVENTURE",
            Gender::Action => "ACTION",
            Gender::Crime => "CRIME",
            Gender::Thriller => "THRILLER",
            Gender::Romance => "ROMANCE",
            Gender::Documentary => "DOCUMENTARY",
            Gender::Animated => "ANIMATED",
            Gender::Fantasy => "FANTASY",
            Gender::Musicals => "MUSICALS",
            Gender::Scifi => "SCIFI",
            Gender::Horror => "HORROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilmType {
    Movie,
    Series,
    Documentary,
}

impl EnumScalar for FilmType {
    const VARIANTS: &'static [&'static str] = &["MOVIE", "SERIES", "DOCUMENTARY"];

    fn name(&self) -> &'static str {
        match self {
            FilmType::Movie => "MOVIE",
            FilmType::Series => "SERIES",
            FilmType::Documentary => "DOCUMENTARY",
        }
    }
}

pub fn film() -> EntityModel {
    EntityModel::new(FILM)
        .required_field("title", ScalarType::Text)
        .field("synopsis", ScalarType::Text)
        .field("views", ScalarType::Integer)
        .field("reviews", ScalarType::Long)
        .field("gender", ScalarType::Enumeration(Gender::VARIANTS))
        .field("filmType", ScalarType::Enumeration(FilmType::VARIANTS))
        .field("order", ScalarType::Integer)
        .required_field("url", ScalarType::Text)
        .many_to_many("people", PERSON, FILM_PERSON_TABLE, "film_id", "person_id")
        .one_to_many("episodes", EPISODE, "film_id")
        .relation_filter("personId", "people")
        .relation_filter("episodesId", "episodes")
        .eager("people")
}

pub fn episode() -> EntityModel {
    EntityModel::new(EPISODE)
        .required_field("title", ScalarType::Text)
        .field("synopsis", ScalarType::Text)
        .field("order", ScalarType::Integer)
        .field("film_id", ScalarType::Long)
        .many_to_one("film", FILM, "film_id")
        .relation_filter("filmId", "film")
        .eager("film")
}

pub fn person() -> EntityModel {
    EntityModel::new(PERSON)
        .required_field("name", ScalarType::Text)
        .many_to_many("films", FILM, FILM_PERSON_TABLE, "person_id", "film_id")
        .relation_filter("filmId", "films")
}

/// Builds the catalog domain model
pub fn catalog_model() -> CompileResult<DomainModel> {
    DomainModel::builder()
        .entity(film())
        .entity(episode())
        .entity(person())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FilterTarget, JoinKind};

    #[test]
    fn test_catalog_model_builds() {
        let model = catalog_model().unwrap();
        assert_eq!(model.entities().count(), 3);
    }

    #[test]
    fn test_film_relation_filters() {
        let model = catalog_model().unwrap();
        let film = model.entity(FILM).unwrap();

        match film.resolve_filter("personId") {
            Some(FilterTarget::RelationId(link)) => {
                assert_eq!(link.related_entity, PERSON);
                assert_eq!(link.join_kind, JoinKind::ManyToMany);
            }
            other => panic!("unexpected target {:?}", other),
        }
        match film.resolve_filter("episodesId") {
            Some(FilterTarget::RelationId(link)) => {
                assert_eq!(link.join_kind, JoinKind::OneToMany)
            }
            other => panic!("unexpected target {:?}", other),
        }
    }

    #[test]
    fn test_eager_relations() {
        let model = catalog_model().unwrap();
        let names: Vec<_> = model
            .entity(FILM)
            .unwrap()
            .eager_relations()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["people"]);

        let episode = model.entity(EPISODE).unwrap();
        assert_eq!(episode.eager_relations().next().unwrap().name, "film");
    }

    #[test]
    fn test_enum_names_are_listed() {
        assert!(Gender::VARIANTS.contains(&Gender::Scifi.name()));
        assert!(FilmType::VARIANTS.contains(&FilmType::Documentary.name()));
    }
}
