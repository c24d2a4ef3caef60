//! Catalog Scenario Tests
//!
//! End-to-end queries against a small film catalog:
//! - title substring search
//! - episodes of one film through the relation filter
//! - impossible ranges
//! - distinct collapsing join duplicates
//! - request parameters compiled the same way as typed criteria

use reeldb::filter::{Criteria, IntegerFilter, LongFilter, StringFilter};
use reeldb::model::{catalog_model, DomainModel, PageRequest, Row, SortOrder};
use reeldb::request::{RequestError, RequestParser};
use reeldb::service::QueryService;
use reeldb::store::MemoryStore;

// =============================================================================
// Helper Functions
// =============================================================================

fn catalog() -> (DomainModel, MemoryStore) {
    let model = catalog_model().unwrap();
    let mut store = MemoryStore::new(&model);

    let films = [
        (1, "The Matrix", 900),
        (2, "Matrix Reloaded", 700),
        (3, "Heat", 300),
        (7, "Twin Peaks", 500),
        (8, "The Wire", 650),
    ];
    for (id, title, views) in films {
        store
            .insert(
                "film",
                Row::new(id)
                    .with("title", title)
                    .with("url", format!("https://films/{}", id))
                    .with("views", views),
            )
            .unwrap();
    }

    let episodes = [
        (70, "Pilot", 7i64, 1),
        (71, "Traces to Nowhere", 7, 2),
        (72, "Zen, or the Skill to Catch a Killer", 7, 3),
        (80, "The Target", 8, 1),
    ];
    for (id, title, film, order) in episodes {
        store
            .insert(
                "episode",
                Row::new(id)
                    .with("title", title)
                    .with("film_id", film)
                    .with("order", order),
            )
            .unwrap();
    }

    for (id, name) in [(10, "Keanu Reeves"), (11, "Carrie-Anne Moss"), (12, "Al Pacino")] {
        store.insert("person", Row::new(id).with("name", name)).unwrap();
    }
    let people = model.relation("film", "people").unwrap().clone();
    for (owner, related) in [(1, 10), (1, 11), (2, 10), (2, 11), (3, 12)] {
        store.link(&people, owner, related).unwrap();
    }
    (model, store)
}

fn titles(rows: &[Row]) -> Vec<&str> {
    rows.iter().filter_map(|row| row.get("title").as_text()).collect()
}

fn ids(rows: &[Row]) -> Vec<i64> {
    rows.iter().map(Row::id).collect()
}

fn params(raw: &[(&str, &str)]) -> Vec<(String, String)> {
    raw.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// =============================================================================
// Scenarios
// =============================================================================

/// title contains "Matrix" finds both Matrix films.
#[test]
fn test_title_contains_matrix() {
    let (model, store) = catalog();
    let service = QueryService::new(&model, &store, "film").unwrap();
    let criteria = Criteria::new().with("title", StringFilter::new().contains("Matrix"));

    let found = service.find_by_criteria(Some(&criteria)).unwrap();
    assert_eq!(titles(&found), vec!["The Matrix", "Matrix Reloaded"]);
    assert_eq!(service.count_by_criteria(Some(&criteria)).unwrap(), 2);
}

/// Episodes filtered by filmId=7 belong to film 7 only.
#[test]
fn test_episodes_of_one_film() {
    let (model, store) = catalog();
    let service = QueryService::new(&model, &store, "episode").unwrap();
    let criteria = Criteria::new().with("filmId", LongFilter::new().equals(7));

    let found = service.find_by_criteria(Some(&criteria)).unwrap();
    assert_eq!(ids(&found), vec![70, 71, 72]);
    assert!(found.iter().all(|episode| episode.get("film_id").as_int() == Some(7)));
}

/// views lessThan 0 matches nothing.
#[test]
fn test_negative_views_is_empty() {
    let (model, store) = catalog();
    let service = QueryService::new(&model, &store, "film").unwrap();
    let criteria = Criteria::new().with("views", IntegerFilter::new().less_than(0));

    assert!(service.find_by_criteria(Some(&criteria)).unwrap().is_empty());
    assert_eq!(service.count_by_criteria(Some(&criteria)).unwrap(), 0);

    let page = service
        .find_page_by_criteria(Some(&criteria), &PageRequest::of(0, 20))
        .unwrap();
    assert!(page.content().is_empty());
    assert_eq!(page.total_pages(), 0);
}

/// distinct=true collapses the duplicates a to-many join produces.
#[test]
fn test_distinct_collapses_join_duplicates() {
    let (model, store) = catalog();
    let service = QueryService::new(&model, &store, "film").unwrap();
    let by_people = Criteria::new().with("personId", LongFilter::new().in_list(vec![10, 11]));

    // Default keeps one row per matching join tuple
    let duplicated = service.find_by_criteria(Some(&by_people)).unwrap();
    assert_eq!(ids(&duplicated), vec![1, 1, 2, 2]);
    assert_eq!(service.count_by_criteria(Some(&by_people)).unwrap(), 4);

    let distinct = by_people.clone().with_distinct(true);
    let collapsed = service.find_by_criteria(Some(&distinct)).unwrap();
    assert_eq!(ids(&collapsed), vec![1, 2]);
    assert_eq!(service.count_by_criteria(Some(&distinct)).unwrap(), 2);
}

/// Films without any person match personId.specified=false.
#[test]
fn test_films_without_people() {
    let (model, store) = catalog();
    let service = QueryService::new(&model, &store, "film").unwrap();
    let criteria = Criteria::new().with("personId", LongFilter::new().specified(false));

    assert_eq!(ids(&service.find_by_criteria(Some(&criteria)).unwrap()), vec![7, 8]);
}

/// People can be found through the films they appear in.
#[test]
fn test_people_by_film() {
    let (model, store) = catalog();
    let service = QueryService::new(&model, &store, "person").unwrap();
    let criteria = Criteria::new()
        .with("filmId", LongFilter::new().in_list(vec![1, 3]))
        .with_distinct(true);

    assert_eq!(ids(&service.find_by_criteria(Some(&criteria)).unwrap()), vec![10, 11, 12]);
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query-string parameters give the same results as typed criteria.
#[test]
fn test_request_parameters() {
    let (model, store) = catalog();
    let service = QueryService::new(&model, &store, "film").unwrap();
    let request = RequestParser::new(&model)
        .parse(
            "film",
            &params(&[
                ("title.contains", "Matrix"),
                ("views.greaterThanOrEqual", "700"),
                ("sort", "views,asc"),
                ("size", "1"),
            ]),
        )
        .unwrap();

    let page_request = request.page.clone().unwrap();
    assert_eq!(page_request.sort, vec![SortOrder::asc("views")]);

    let page = service
        .find_page_by_criteria(Some(&request.criteria), &page_request)
        .unwrap();
    assert_eq!(titles(page.content()), vec!["Matrix Reloaded"]);
    assert_eq!(page.total_elements(), 2);
    assert_eq!(page.total_pages(), 2);
}

/// An empty `in` parameter is an empty list, not a parse error.
#[test]
fn test_empty_in_parameter() {
    let (model, store) = catalog();
    let service = QueryService::new(&model, &store, "film").unwrap();
    let request = RequestParser::new(&model)
        .parse("film", &params(&[("id.in", "")]))
        .unwrap();

    assert_eq!(service.count_by_criteria(Some(&request.criteria)).unwrap(), 0);
}

/// Malformed parameters are rejected before compilation.
#[test]
fn test_malformed_parameters_are_rejected() {
    let model = catalog_model().unwrap();
    let parser = RequestParser::new(&model);

    let err = parser
        .parse("film", &params(&[("views.contains", "9")]))
        .unwrap_err();
    assert!(matches!(err, RequestError::UnsupportedOperator { .. }));

    let err = parser
        .parse("film", &params(&[("views.equals", "many")]))
        .unwrap_err();
    assert!(matches!(err, RequestError::InvalidValue { .. }));

    let err = parser
        .parse("film", &params(&[("gender.equals", "WESTERN")]))
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}
