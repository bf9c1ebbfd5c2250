use chrono::Utc;
use serde_json::json;
use sitelens_core::{
    ConfigError, Criteria, DashboardService, EngineConfig, FnSource, JsonSnapshotSource,
    ProjectRecord, RecordSource, SourceError, TimelineRecord,
};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn failed_fetch_degrades_to_an_empty_dashboard() {
    let source = FnSource(|| -> Result<Vec<ProjectRecord>, SourceError> {
        Err(SourceError::Unavailable("backend down".to_string()))
    });
    let service = DashboardService::new(source, EngineConfig::default());

    let outcome = service.query(&service.params(Criteria::at(Utc::now())));
    assert_eq!(outcome.summary.count, 0);
    assert_eq!(outcome.summary.average_amount, 0.0);
    assert!(outcome.page.items.is_empty());
    assert_eq!(outcome.page.total_pages, 0);
}

#[test]
fn snapshot_file_feeds_the_pipeline() {
    let mut file = NamedTempFile::new().unwrap();
    let document = json!({
        "data": [
            { "id": 1, "date": "2024-04-02", "materials": [{ "cost": "12,000" }], "notes": "slab" },
            { "id": 2, "date": "2024-04-03", "expenses": [{ "amount": 300 }] },
            { "id": 3, "date": "2024-05-01", "workers": null, "materials": null }
        ]
    });
    write!(file, "{document}").unwrap();

    let config = EngineConfig {
        default_page_size: 2,
        ..EngineConfig::default()
    };
    let source = JsonSnapshotSource::from_path(file.path());
    let service: DashboardService<TimelineRecord, _> = DashboardService::new(source, config);
    let outcome = service.query(&service.params(Criteria::at(Utc::now())));

    assert_eq!(outcome.summary.count, 3);
    assert_eq!(outcome.summary.total_amount, 12_300.0);
    assert_eq!(outcome.summary.high_cost_count, 1);
    assert_eq!(outcome.page.items.len(), 2);
    assert_eq!(outcome.page.items[0].id.as_str(), "1");
    assert!(outcome.page.has_next);
}

#[test]
fn missing_snapshot_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = JsonSnapshotSource::from_path(dir.path().join("absent.json"));
    let result: Result<Vec<TimelineRecord>, SourceError> = source.fetch();
    assert_eq!(result.unwrap_err().kind(), "io");
}

#[test]
fn config_thresholds_flow_into_queries() {
    let source = JsonSnapshotSource::from_json(
        r#"[{ "id": "a", "budget": 800 }, { "id": "b", "budget": 1200 }]"#,
    );
    let config = EngineConfig::from_json_str(r#"{ "highCostThreshold": 1000 }"#).unwrap();
    let service: DashboardService<ProjectRecord, _> = DashboardService::new(source, config);

    let outcome = service.query(&service.params(Criteria::at(Utc::now())));
    assert_eq!(outcome.summary.high_cost_count, 1);
    assert_eq!(service.config().default_page_size, 10);
}

#[test]
fn config_file_loads_and_rejects_bad_values() {
    let mut good = NamedTempFile::new().unwrap();
    write!(good, r#"{{ "defaultPageSize": 25, "monthWindow": 12 }}"#).unwrap();
    let config = EngineConfig::load(good.path()).unwrap();
    assert_eq!(config.month_window, 12);

    let mut bad = NamedTempFile::new().unwrap();
    write!(bad, r#"{{ "defaultPageSize": 0 }}"#).unwrap();
    assert!(matches!(
        EngineConfig::load(bad.path()),
        Err(ConfigError::Invalid { .. })
    ));

    let mut malformed = NamedTempFile::new().unwrap();
    write!(malformed, "not json").unwrap();
    assert!(matches!(
        EngineConfig::load(malformed.path()),
        Err(ConfigError::Json(_))
    ));
}
