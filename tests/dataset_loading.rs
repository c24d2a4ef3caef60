//! Dataset and CLI Tests
//!
//! Tests for loading a catalog from disk and running CLI commands on it:
//! - a dataset file loads into a queryable store
//! - bad files are rejected with stable codes
//! - find / count / get produce the documented JSON shapes

use std::fs;
use std::path::PathBuf;

use serde_json::json;
use tempfile::TempDir;

use reeldb::cli::{run_command, CliError, Command};
use reeldb::filter::{Criteria, LongFilter};
use reeldb::model::catalog_model;
use reeldb::service::QueryService;
use reeldb::store::{load_dataset, StoreError};

// =============================================================================
// Helper Functions
// =============================================================================

const CATALOG: &str = r#"{
    "entities": {
        "film": [
            { "id": 1, "title": "The Matrix", "url": "m1", "views": 900, "gender": "SCIFI", "filmType": "MOVIE" },
            { "id": 2, "title": "Matrix Reloaded", "url": "m2", "views": 700, "gender": "SCIFI" },
            { "id": 7, "title": "Twin Peaks", "url": "tp", "views": 500, "filmType": "SERIES" }
        ],
        "episode": [
            { "id": 70, "title": "Pilot", "film_id": 7, "order": 1 },
            { "id": 71, "title": "Traces to Nowhere", "film_id": 7, "order": 2 }
        ],
        "person": [
            { "id": 10, "name": "Keanu Reeves" },
            { "id": 11, "name": "Carrie-Anne Moss" }
        ]
    },
    "links": [
        { "entity": "film", "relation": "people", "owner": 1, "related": 10 },
        { "entity": "film", "relation": "people", "owner": 1, "related": 11 },
        { "entity": "person", "relation": "films", "owner": 10, "related": 2 }
    ]
}"#;

fn workspace(dataset: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("catalog.json"), dataset).unwrap();
    let config = dir.path().join("reeldb.json");
    fs::write(
        &config,
        r#"{"data_file": "catalog.json", "default_page_size": 10, "max_page_size": 50, "log_level": "WARN"}"#,
    )
    .unwrap();
    (dir, config)
}

fn params(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|p| p.to_string()).collect()
}

// =============================================================================
// Dataset Loading
// =============================================================================

/// Links given from either side of a join table are the same pairs.
#[test]
fn test_dataset_file_is_queryable() {
    let (dir, _config) = workspace(CATALOG);
    let model = catalog_model().unwrap();
    let store = load_dataset(&dir.path().join("catalog.json"), &model).unwrap();

    let films = QueryService::new(&model, &store, "film").unwrap();
    let with_keanu = Criteria::new().with("personId", LongFilter::new().equals(10));
    let found = films.find_by_criteria(Some(&with_keanu)).unwrap();
    assert_eq!(found.iter().map(|r| r.id()).collect::<Vec<_>>(), vec![1, 2]);

    let episodes = QueryService::new(&model, &store, "episode").unwrap();
    let of_seven = Criteria::new().with("filmId", LongFilter::new().equals(7));
    assert_eq!(episodes.count_by_criteria(Some(&of_seven)).unwrap(), 2);
}

#[test]
fn test_missing_dataset_file() {
    let dir = TempDir::new().unwrap();
    let model = catalog_model().unwrap();
    let err = load_dataset(&dir.path().join("absent.json"), &model).unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
    assert_eq!(err.code(), "REEL_STORE_IO");
}

#[test]
fn test_duplicate_rows_rejected() {
    let (dir, _config) = workspace(
        r#"{ "entities": { "person": [ { "id": 1, "name": "A" }, { "id": 1, "name": "B" } ] } }"#,
    );
    let model = catalog_model().unwrap();
    let err = load_dataset(&dir.path().join("catalog.json"), &model).unwrap_err();
    assert_eq!(err.code(), "REEL_STORE_DUPLICATE_ROW");
}

// =============================================================================
// CLI Commands
// =============================================================================

#[test]
fn test_find_command() {
    let (_dir, config) = workspace(CATALOG);
    let data = run_command(Command::Find {
        config,
        entity: "film".into(),
        params: params(&["title.contains=Matrix", "sort=views,desc"]),
        eager: true,
    })
    .unwrap();

    assert_eq!(data["totalElements"], 2);
    assert_eq!(data["totalPages"], 1);
    assert_eq!(data["size"], 10);
    assert_eq!(data["content"][0]["title"], "The Matrix");
    assert_eq!(data["content"][0]["people"].as_array().map(Vec::len), Some(2));
    assert_eq!(data["content"][1]["people"][0]["name"], "Keanu Reeves");
}

/// Film 1 matches through two people but is listed and materialized once.
#[test]
fn test_find_eager_by_people() {
    let (_dir, config) = workspace(CATALOG);
    let data = run_command(Command::Find {
        config,
        entity: "film".into(),
        params: params(&["personId.in=10,11"]),
        eager: true,
    })
    .unwrap();

    let ids: Vec<i64> = data["content"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|film| film["id"].as_i64())
        .collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(data["totalElements"], 2);
    assert_eq!(data["content"][0]["people"].as_array().map(Vec::len), Some(2));
}

/// Requested page sizes above the configured maximum are clamped.
#[test]
fn test_find_clamps_page_size() {
    let (_dir, config) = workspace(CATALOG);
    let data = run_command(Command::Find {
        config,
        entity: "film".into(),
        params: params(&["size=500"]),
        eager: false,
    })
    .unwrap();
    assert_eq!(data["size"], 50);
    assert_eq!(data["totalElements"], 3);
}

#[test]
fn test_count_command() {
    let (_dir, config) = workspace(CATALOG);
    let data = run_command(Command::Count {
        config,
        entity: "film".into(),
        params: params(&["filmType.equals=SERIES"]),
    })
    .unwrap();
    assert_eq!(data, json!({ "count": 1 }));
}

/// get loads eager relations: an episode comes back with its film.
#[test]
fn test_get_command() {
    let (_dir, config) = workspace(CATALOG);
    let data = run_command(Command::Get {
        config,
        entity: "episode".into(),
        id: 71,
    })
    .unwrap();
    assert_eq!(data["title"], "Traces to Nowhere");
    assert_eq!(data["film"][0]["title"], "Twin Peaks");
}

#[test]
fn test_command_errors_carry_codes() {
    let (_dir, config) = workspace(CATALOG);

    let err = run_command(Command::Find {
        config: config.clone(),
        entity: "film".into(),
        params: params(&["views.greaterThan=lots"]),
        eager: false,
    })
    .unwrap_err();
    assert!(matches!(err, CliError::Request(_)));
    assert_eq!(err.code_str(), "REEL_REQUEST_INVALID_VALUE");

    let err = run_command(Command::Count {
        config: config.clone(),
        entity: "studio".into(),
        params: Vec::new(),
    })
    .unwrap_err();
    assert_eq!(err.code_str(), "REEL_UNKNOWN_ENTITY");

    let err = run_command(Command::Get {
        config: config.with_file_name("missing.json"),
        entity: "film".into(),
        id: 1,
    })
    .unwrap_err();
    assert_eq!(err.code_str(), "REEL_CONFIG_READ");
}
