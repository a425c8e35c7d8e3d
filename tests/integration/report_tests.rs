//! Run report, viewer and argument handling tests.
//!
//! Tests verify:
//! - JSON report contents
//! - Leaflet viewer page written next to the tiles
//! - CLI arguments parse into a runnable config
//! - Zoom and option errors fail before anything is read or written

use std::ffi::OsString;

use clap::Parser;
use image::ImageFormat;

use slippy_tiler::{run, Config, EdgePolicy, OutputFormat, TilerError};

use super::test_utils::{tiler_config, write_source};

// =============================================================================
// JSON Report
// =============================================================================

#[tokio::test]
async fn test_json_report_fields() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "world.png", 128, 128, ImageFormat::Png);
    let output = dir.path().join("tiles");

    let mut config = tiler_config(&input, "1-2", &output);
    config.edge_policy = EdgePolicy::Pad;

    let report = run(&config).await.unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&serde_json::to_string_pretty(&report).unwrap()).unwrap();

    assert_eq!(json["width"], 128);
    assert_eq!(json["height"], 128);
    assert_eq!(json["format"], "png");
    assert_eq!(json["resize_width"], 32);
    assert_eq!(json["edge_policy"], "pad");
    assert_eq!(json["viewer"], serde_json::Value::Null);

    let levels = json["zoom_levels"].as_array().unwrap();
    assert_eq!(levels.len(), 2);
    assert_eq!(levels[0]["zoom"], 1);
    assert_eq!(levels[0]["tile_count"], 2);
    assert_eq!(levels[0]["raw_tile_width"], 64);
    assert_eq!(levels[1]["tiles_written"], 16);
}

// =============================================================================
// Viewer
// =============================================================================

#[tokio::test]
async fn test_viewer_page() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "world.png", 128, 128, ImageFormat::Png);
    let output = dir.path().join("tiles");

    let mut config = tiler_config(&input, "0-2", &output);
    config.viewer = true;
    config.resize_width = 64;

    let report = run(&config).await.unwrap();
    assert_eq!(report.viewer.as_deref(), Some(output.join("index.html").as_path()));

    let html = std::fs::read_to_string(output.join("index.html")).unwrap();
    assert!(html.contains("L.CRS.Simple"));
    assert!(html.contains("{z}/{x}/{y}.png"));
    assert!(html.contains("const tileSize = 64;"));
    assert!(html.contains("minZoom: 0"));
    assert!(html.contains("maxZoom: 2"));
}

// =============================================================================
// Arguments
// =============================================================================

#[tokio::test]
async fn test_parsed_cli_runs() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "world.png", 64, 64, ImageFormat::Png);
    let output = dir.path().join("tiles");

    let args: Vec<OsString> = vec![
        "slippy-tiler".into(),
        input.clone().into_os_string(),
        "1".into(),
        output.clone().into_os_string(),
        "-w".into(),
        "16".into(),
        "-q".into(),
        "--format".into(),
        "json".into(),
    ];
    let config = Config::try_parse_from(args).unwrap();
    assert_eq!(config.format, OutputFormat::Json);

    let report = run(&config).await.unwrap();
    assert_eq!(report.resize_width, 16);

    let tile = image::open(output.join("1/1/1.png")).unwrap();
    assert_eq!((tile.width(), tile.height()), (16, 16));
}

#[tokio::test]
async fn test_bad_zoom_fails_before_reading_source() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("tiles");

    for zoom in ["abc", "4-2", "2-", "31"] {
        let config = tiler_config(&dir.path().join("missing.png"), zoom, &output);
        let err = run(&config).await.unwrap_err();
        assert!(
            matches!(err, TilerError::ZoomParse { .. }),
            "{}: {:?}",
            zoom,
            err
        );
        assert_eq!(err.exit_code(), 2);
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn test_zero_width_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "world.png", 64, 64, ImageFormat::Png);

    let mut config = tiler_config(&input, "1", &dir.path().join("tiles"));
    config.resize_width = 0;

    let err = run(&config).await.unwrap_err();
    assert!(matches!(err, TilerError::Config(_)));
    assert_eq!(err.exit_code(), 2);
}
