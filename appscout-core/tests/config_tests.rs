// Tests for run configuration

use appscout_core::config::{InstallThreshold, RunConfig, ThresholdMode, WindowUnit};
use appscout_core::error::ConfigError;
use appscout_scanner::Storefront;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Parsing Tests
// ============================================================================

#[test]
fn test_empty_file_uses_defaults() {
    let config = RunConfig::from_json("{}").unwrap();
    assert_eq!(config, RunConfig::default());
    assert_eq!(config.storefront, Storefront::GooglePlay);
    assert_eq!(config.output, "google_play_apps.csv");
    assert!(!config.resume);
}

#[test]
fn test_full_file() {
    let json = r#"{
        "storefront": "app_store",
        "seeds": ["https://apps.apple.com/us/app/x/id1"],
        "output": "out/apps.csv",
        "max_nodes": 50,
        "max_depth": 2,
        "per_page_fanout": 5,
        "request_delay_ms": 250,
        "target_accepted": 10,
        "max_retries": 2,
        "resume": true,
        "filter": {
            "recency": {"amount": 90, "unit": "days"},
            "installs": {"threshold": "5K", "mode": "at_least"}
        }
    }"#;
    let config = RunConfig::from_json(json).unwrap();
    assert_eq!(config.storefront, Storefront::AppStore);
    assert_eq!(config.seeds.len(), 1);
    assert_eq!(config.target_accepted, Some(10));
    assert!(config.resume);

    let recency = config.filter.recency.as_ref().unwrap();
    assert_eq!(recency.amount, 90);
    assert_eq!(recency.unit, WindowUnit::Days);
    assert_eq!(
        config.filter.installs,
        Some(InstallThreshold {
            threshold: 5_000,
            mode: ThresholdMode::AtLeast
        })
    );

    let limits = config.limits();
    assert_eq!(limits.max_nodes, 50);
    assert_eq!(limits.per_page_fanout, 5);
    assert_eq!(limits.request_delay, Duration::from_millis(250));
    assert_eq!(limits.max_retries, 2);
}

#[test]
fn test_numeric_threshold() {
    let json = r#"{"filter": {"installs": {"threshold": 1000, "mode": "at_most"}}}"#;
    let config = RunConfig::from_json(json).unwrap();
    let installs = config.filter.installs.unwrap();
    assert_eq!(installs.threshold, 1000);
    assert_eq!(installs.mode, ThresholdMode::AtMost);
}

#[test]
fn test_malformed_threshold_rejected() {
    let json = r#"{"filter": {"installs": {"threshold": "lots", "mode": "at_least"}}}"#;
    assert!(RunConfig::from_json(json).is_err());
    assert!(matches!(
        InstallThreshold::parse("lots", ThresholdMode::AtLeast),
        Err(ConfigError::Invalid { .. })
    ));
    assert_eq!(
        InstallThreshold::parse("1.5M", ThresholdMode::AtMost).unwrap().threshold,
        1_500_000
    );
}

#[test]
fn test_from_file_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(matches!(RunConfig::from_file(&missing), Err(ConfigError::Read { .. })));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    assert!(matches!(RunConfig::from_file(&broken), Err(ConfigError::Parse { .. })));

    let good = dir.path().join("good.json");
    fs::write(&good, r#"{"max_depth": 3}"#).unwrap();
    assert_eq!(RunConfig::from_file(&good).unwrap().max_depth, 3);
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_zero_budget_invalid() {
    let config = RunConfig {
        max_nodes: 0,
        ..RunConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "max_nodes", .. })
    ));
}

#[test]
fn test_zero_target_invalid() {
    let config = RunConfig {
        target_accepted: Some(0),
        ..RunConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_window_invalid() {
    let config =
        RunConfig::from_json(r#"{"filter": {"recency": {"amount": 0, "unit": "months"}}}"#).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "filter.recency.amount", .. })
    ));
}

#[test]
fn test_empty_date_format_invalid() {
    let config = RunConfig::from_json(
        r#"{"filter": {"recency": {"amount": 3, "unit": "months", "date_format": " "}}}"#,
    )
    .unwrap();
    assert!(config.validate().is_err());
}

// ============================================================================
// Derived Value Tests
// ============================================================================

#[test]
fn test_date_format_follows_storefront() {
    let play = RunConfig::default();
    assert_eq!(play.date_format(), "%b %d, %Y");
    let app_store = RunConfig {
        storefront: Storefront::AppStore,
        ..RunConfig::default()
    };
    assert_eq!(app_store.date_format(), "%B %d, %Y");
}

#[test]
fn test_output_path_plain() {
    let config = RunConfig {
        output: "data/apps.csv".to_string(),
        ..RunConfig::default()
    };
    assert_eq!(config.output_path(), std::path::PathBuf::from("data/apps.csv"));
}
