//! CLI command implementations
//!
//! Every command follows the same boot sequence:
//! 1. Load and validate the config
//! 2. Apply the configured log level
//! 3. Build the catalog model and load the dataset into a memory store
//! 4. Run one query and print one JSON response
//!
//! Commands never modify the dataset file.

use std::path::Path;

use serde_json::{json, Value};

use crate::config::ReelConfig;
use crate::model::{catalog_model, DomainModel, Page, PageRequest, Row};
use crate::observability::{log_event, Event, Logger};
use crate::request::{RequestParams, RequestParser};
use crate::service::QueryService;
use crate::store::{load_dataset, MemoryStore};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Loaded config, model and store shared by all commands
#[derive(Debug)]
struct Session {
    config: ReelConfig,
    model: DomainModel,
    store: MemoryStore,
}

impl Session {
    fn open(config_path: &Path) -> CliResult<Self> {
        let config = ReelConfig::load(config_path)?;
        Logger::set_min_severity(config.log_severity()?);

        let path = config_path.display().to_string();
        let data_file = config.data_file.display().to_string();
        log_event(
            Event::ConfigLoaded,
            &[("data_file", data_file.as_str()), ("path", path.as_str())],
        );

        let model = catalog_model()?;
        let store = load_dataset(&config.data_file, &model)?;
        Ok(Self {
            config,
            model,
            store,
        })
    }

    fn service(&self, entity: &str) -> CliResult<QueryService<'_, MemoryStore>> {
        Ok(QueryService::new(&self.model, &self.store, entity)?
            .with_max_page_size(self.config.max_page_size))
    }

    /// Parses `key=value` arguments, logging rejected requests
    fn parse(&self, entity: &str, params: &[String]) -> CliResult<RequestParams> {
        let parsed = RequestParser::new(&self.model)
            .with_default_page_size(self.config.default_page_size)
            .parse(entity, &split_params(params)?);
        parsed.map_err(|err| {
            let message = err.to_string();
            log_event(
                Event::QueryRejected,
                &[
                    ("code", err.code()),
                    ("entity", entity),
                    ("message", message.as_str()),
                ],
            );
            CliError::from(err)
        })
    }
}

/// Parse arguments, run the command and print its response
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(err) => {
            write_error(err.code_str(), &err.to_string())?;
            Err(err)
        }
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Find {
            config,
            entity,
            params,
            eager,
        } => find(&config, &entity, &params, eager),
        Command::Count {
            config,
            entity,
            params,
        } => count(&config, &entity, &params),
        Command::Get { config, entity, id } => get(&config, &entity, id),
    }
}

/// One page of matching rows.
///
/// Without paging parameters the first page at the configured default size
/// is returned. Eager finds always run distinct so each parent is
/// materialized once.
pub fn find(config_path: &Path, entity: &str, params: &[String], eager: bool) -> CliResult<Value> {
    let session = Session::open(config_path)?;
    let mut request = session.parse(entity, params)?;
    if eager {
        request.criteria.set_distinct(Some(true));
    }
    let page = request
        .page
        .unwrap_or_else(|| PageRequest::of(0, session.config.default_page_size));

    let service = session.service(entity)?;
    let mut page = service.find_page_by_criteria(Some(&request.criteria), &page)?;
    if eager {
        let (content, request, total) = page.into_parts();
        page = Page::new(service.materialize_eager(content)?, request, total);
    }
    Ok(page.to_json(Row::to_json))
}

/// Number of matching rows; paging parameters are ignored
pub fn count(config_path: &Path, entity: &str, params: &[String]) -> CliResult<Value> {
    let session = Session::open(config_path)?;
    let request = session.parse(entity, params)?;
    let count = session
        .service(entity)?
        .count_by_criteria(Some(&request.criteria))?;
    Ok(json!({ "count": count }))
}

/// One row with its eager relations
pub fn get(config_path: &Path, entity: &str, id: i64) -> CliResult<Value> {
    let session = Session::open(config_path)?;
    match session.service(entity)?.find_one_eager(id)? {
        Some(row) => Ok(row.to_json()),
        None => Err(CliError::NotFound {
            entity: entity.to_string(),
            id,
        }),
    }
}

/// Splits `key=value` arguments at the first `=`
fn split_params(params: &[String]) -> CliResult<Vec<(String, String)>> {
    params
        .iter()
        .map(|param| match param.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(CliError::InvalidArgument(param.clone())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::Severity;
    use std::fs;
    use tempfile::TempDir;

    const DATASET: &str = r#"{
        "entities": {
            "film": [
                { "id": 1, "title": "The Matrix", "url": "m1", "views": 900 },
                { "id": 2, "title": "Matrix Reloaded", "url": "m2", "views": 400 },
                { "id": 3, "title": "Heat", "url": "h", "views": 300 }
            ],
            "person": [ { "id": 10, "name": "Keanu" }, { "id": 11, "name": "Carrie-Anne" } ]
        },
        "links": [
            { "entity": "film", "relation": "people", "owner": 1, "related": 10 },
            { "entity": "film", "relation": "people", "owner": 1, "related": 11 },
            { "entity": "film", "relation": "people", "owner": 2, "related": 10 }
        ]
    }"#;

    fn setup() -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("catalog.json"), DATASET).unwrap();
        let config = dir.path().join("reeldb.json");
        fs::write(
            &config,
            r#"{"data_file": "catalog.json", "default_page_size": 2, "log_level": "ERROR"}"#,
        )
        .unwrap();
        (dir, config)
    }

    fn params(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_split_params() {
        let split = split_params(&params(&["sort=views,desc", "title.equals=a=b"])).unwrap();
        assert_eq!(split[0], ("sort".to_string(), "views,desc".to_string()));
        assert_eq!(split[1], ("title.equals".to_string(), "a=b".to_string()));

        assert!(matches!(
            split_params(&params(&["title"])),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(split_params(&params(&["=x"])).is_err());
    }

    #[test]
    fn test_find_uses_default_page_size() {
        let (_dir, config) = setup();
        let data = find(&config, "film", &params(&["sort=views,desc"]), false).unwrap();
        assert_eq!(data["size"], 2);
        assert_eq!(data["totalElements"], 3);
        assert_eq!(data["content"][0]["title"], "The Matrix");
        assert!(data["content"][0].get("people").is_none());
    }

    #[test]
    fn test_find_eager() {
        let (_dir, config) = setup();
        let data = find(&config, "film", &params(&["title.contains=Matrix"]), true).unwrap();
        assert_eq!(data["totalElements"], 2);
        assert_eq!(data["content"][0]["people"][0]["name"], "Keanu");
        assert_eq!(data["content"][1]["people"][0]["name"], "Keanu");
    }

    /// A to-many filter joins film 1 twice; eager find still lists it once.
    #[test]
    fn test_find_eager_through_relation_filter() {
        let (_dir, config) = setup();
        let filter = params(&["personId.in=10,11"]);

        let plain = find(&config, "film", &filter, false).unwrap();
        assert_eq!(plain["totalElements"], 3);

        let data = find(&config, "film", &filter, true).unwrap();
        assert_eq!(data["totalElements"], 2);
        assert_eq!(data["content"][0]["id"], 1);
        assert_eq!(data["content"][0]["people"].as_array().map(Vec::len), Some(2));
        assert_eq!(data["content"][1]["id"], 2);
    }

    #[test]
    fn test_open_applies_log_level() {
        let (_dir, config) = setup();
        let session = Session::open(&config).unwrap();
        assert_eq!(session.config.log_severity().unwrap(), Severity::Error);
        assert_eq!(Logger::min_severity(), Severity::Error);
        assert!(!Logger::enabled(Severity::Info));
    }

    #[test]
    fn test_count() {
        let (_dir, config) = setup();
        let data = count(&config, "film", &params(&["views.lessThan=0"])).unwrap();
        assert_eq!(data, json!({ "count": 0 }));
    }

    #[test]
    fn test_get_missing_row() {
        let (_dir, config) = setup();
        let err = get(&config, "film", 42).unwrap_err();
        assert_eq!(err.code_str(), "REEL_CLI_NOT_FOUND");
    }

    #[test]
    fn test_bad_parameter_is_rejected() {
        let (_dir, config) = setup();
        let err = find(&config, "film", &params(&["budget.equals=3"]), false).unwrap_err();
        assert_eq!(err.code_str(), "REEL_REQUEST_UNKNOWN_FIELD");
    }
}
