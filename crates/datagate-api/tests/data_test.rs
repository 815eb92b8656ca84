//! Dataset API integration tests.
//!
//! Run with: `cargo test -p datagate-api --test data_test`

mod helpers;

use helpers::{record, setup_test_app, setup_test_app_with_records};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

/// Create a dataset directory on disk: two images at the top level, one
/// nested image, and one non-image file.
fn create_dataset() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create dataset directory");
    fs::write(dir.path().join("scan_001.png"), b"png").unwrap();
    fs::write(dir.path().join("scan_002.png"), b"png").unwrap();
    fs::write(dir.path().join("notes.txt"), b"txt").unwrap();
    fs::create_dir(dir.path().join("calibration")).unwrap();
    fs::write(dir.path().join("calibration/dark.png"), b"png").unwrap();
    dir
}

#[tokio::test]
async fn test_dataset_files_matches_pattern_recursively() {
    let dataset = create_dataset();
    let app = setup_test_app_with_records(Some(vec![record(json!({
        "did": "beamline/run-42",
        "data_location_raw": dataset.path().to_str().unwrap(),
    }))]))
    .await;

    let response = app
        .client()
        .get("/data")
        .add_query_param("did", "beamline/run-42")
        .add_query_param("pattern", r".*\.png")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 3);
    assert!(files
        .iter()
        .all(|f| f.as_str().unwrap().ends_with(".png")));
    assert!(body["warnings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_dataset_files_default_pattern_returns_everything() {
    let dataset = create_dataset();
    let app = setup_test_app_with_records(Some(vec![record(json!({
        "did": "beamline/run-42",
        "location": dataset.path().to_str().unwrap(),
    }))]))
    .await;

    let response = app
        .client()
        .get("/data")
        .add_query_param("did", "beamline/run-42")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["files"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_dataset_files_invalid_pattern_is_400() {
    let dataset = create_dataset();
    let app = setup_test_app_with_records(Some(vec![record(json!({
        "did": "beamline/run-42",
        "location": dataset.path().to_str().unwrap(),
    }))]))
    .await;

    let response = app
        .client()
        .get("/data")
        .add_query_param("did", "beamline/run-42")
        .add_query_param("pattern", "([unclosed")
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_dataset_files_unknown_did_is_502() {
    let app = setup_test_app_with_records(Some(vec![])).await;

    let response = app
        .client()
        .get("/data")
        .add_query_param("did", "no/such/dataset")
        .await;
    assert_eq!(response.status_code(), 502);

    let body: Value = response.json();
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn test_dataset_files_without_catalog_is_500() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/data")
        .add_query_param("did", "beamline/run-42")
        .await;
    assert_eq!(response.status_code(), 500);
}

#[tokio::test]
async fn test_dataset_listing_reports_entries_relative_to_sub() {
    let dataset = create_dataset();
    let app = setup_test_app_with_records(Some(vec![record(json!({
        "did": "beamline/run-42",
        "location": dataset.path().to_str().unwrap(),
    }))]))
    .await;

    let response = app
        .client()
        .get("/data/files")
        .add_query_param("did", "beamline/run-42")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 4);

    let calibration = entries
        .iter()
        .find(|e| e["name"] == "calibration")
        .expect("calibration entry missing");
    assert_eq!(calibration["is_dir"], true);
    assert_eq!(calibration["did"], "beamline/run-42");
    assert_eq!(calibration["path"], "calibration");

    let response = app
        .client()
        .get("/data/files")
        .add_query_param("did", "beamline/run-42")
        .add_query_param("sub", "calibration")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "dark.png");
    assert_eq!(entries[0]["path"], "calibration/dark.png");
}

#[tokio::test]
async fn test_dataset_listing_rejects_parent_traversal() {
    let dataset = create_dataset();
    let app = setup_test_app_with_records(Some(vec![record(json!({
        "did": "beamline/run-42",
        "location": dataset.path().to_str().unwrap(),
    }))]))
    .await;

    let response = app
        .client()
        .get("/data/files")
        .add_query_param("did", "beamline/run-42")
        .add_query_param("sub", "../outside")
        .await;
    assert_eq!(response.status_code(), 400);
}
