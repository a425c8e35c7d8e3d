//! End-to-end pyramid generation tests.
//!
//! Tests verify:
//! - Complete `2^z × 2^z` levels of `resize_width` square tiles
//! - Row-major placement of tile content
//! - Independent zoom subtrees and deterministic re-runs
//! - No output for rejected sources
//! - Edge policies on sizes that do not divide evenly

use image::ImageFormat;

use slippy_tiler::{run, EdgePolicy, TilerError};

use super::test_utils::{
    all_files, assert_complete_level, centre_rgb, entry_names, is_png_magic, rgb_near,
    tiler_config, write_source,
};

const RED: [u8; 3] = [255, 0, 0];
const GREEN: [u8; 3] = [0, 255, 0];
const BLUE: [u8; 3] = [0, 0, 255];
const WHITE: [u8; 3] = [255, 255, 255];

// =============================================================================
// Layout
// =============================================================================

#[tokio::test]
async fn test_single_level_layout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "src.png", 256, 256, ImageFormat::Png);
    let output = dir.path().join("tiles");

    run(&tiler_config(&input, "3", &output)).await.unwrap();

    assert_eq!(entry_names(&output), vec!["3".to_string()]);
    assert_complete_level(&output, 3, 32);

    let tile = std::fs::read(output.join("3/0/0.png")).unwrap();
    assert!(is_png_magic(&tile));
}

#[tokio::test]
async fn test_zoom_zero_is_single_tile() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "src.png", 64, 64, ImageFormat::Png);
    let output = dir.path().join("tiles");

    run(&tiler_config(&input, "0", &output)).await.unwrap();

    assert_eq!(all_files(&output), vec![std::path::PathBuf::from("0/0/0.png")]);
    assert_complete_level(&output, 0, 32);
}

#[tokio::test]
async fn test_row_major_placement() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "src.png", 128, 128, ImageFormat::Png);
    let output = dir.path().join("tiles");

    run(&tiler_config(&input, "1", &output)).await.unwrap();

    // Flat index 0..4 lands at column i % 2, row i / 2
    for (path, colour) in [
        ("1/0/0.png", RED),
        ("1/1/0.png", GREEN),
        ("1/0/1.png", BLUE),
        ("1/1/1.png", WHITE),
    ] {
        let actual = centre_rgb(&output.join(path));
        assert!(rgb_near(actual, colour, 2), "{}: {:?}", path, actual);
    }
}

#[tokio::test]
async fn test_every_source_format_tiles() {
    let dir = tempfile::tempdir().unwrap();

    for (name, format) in [
        ("src.jpg", ImageFormat::Jpeg),
        ("src.tif", ImageFormat::Tiff),
    ] {
        let input = write_source(dir.path(), name, 128, 128, format);
        let output = dir.path().join(format!("tiles-{}", name));

        run(&tiler_config(&input, "1", &output)).await.unwrap();
        assert_complete_level(&output, 1, 32);

        let top_left = centre_rgb(&output.join("1/0/0.png"));
        assert!(rgb_near(top_left, RED, 12), "{}: {:?}", name, top_left);
    }
}

// =============================================================================
// Zoom Ranges
// =============================================================================

#[tokio::test]
async fn test_range_generates_each_level() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "src.png", 256, 256, ImageFormat::Png);
    let output = dir.path().join("tiles");

    let report = run(&tiler_config(&input, "2-4", &output)).await.unwrap();

    let zooms: Vec<u32> = report.zoom_levels.iter().map(|z| z.zoom).collect();
    assert_eq!(zooms, vec![2, 3, 4]);
    assert_eq!(
        entry_names(&output),
        vec!["2".to_string(), "3".to_string(), "4".to_string()]
    );
    for zoom in 2..=4 {
        assert_complete_level(&output, zoom, 32);
    }
}

#[tokio::test]
async fn test_separate_runs_keep_both_levels() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "src.png", 128, 128, ImageFormat::Png);
    let output = dir.path().join("tiles");

    run(&tiler_config(&input, "1", &output)).await.unwrap();
    run(&tiler_config(&input, "2", &output)).await.unwrap();

    assert_complete_level(&output, 1, 32);
    assert_complete_level(&output, 2, 32);
}

#[tokio::test]
async fn test_rerun_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "src.png", 128, 128, ImageFormat::Png);
    let output = dir.path().join("tiles");

    run(&tiler_config(&input, "0-2", &output)).await.unwrap();
    let first: Vec<Vec<u8>> = all_files(&output)
        .iter()
        .map(|p| std::fs::read(output.join(p)).unwrap())
        .collect();

    run(&tiler_config(&input, "2", &output)).await.unwrap();
    let second: Vec<Vec<u8>> = all_files(&output)
        .iter()
        .map(|p| std::fs::read(output.join(p)).unwrap())
        .collect();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_no_staging_left_behind() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "src.png", 128, 128, ImageFormat::Png);
    let output = dir.path().join("tiles");

    run(&tiler_config(&input, "0-3", &output)).await.unwrap();

    assert!(entry_names(&output).iter().all(|name| !name.starts_with('.')));
    let files = all_files(&output);
    assert_eq!(files.len(), 1 + 4 + 16 + 64);
}

// =============================================================================
// Rejected Sources
// =============================================================================

#[tokio::test]
async fn test_non_square_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "wide.png", 256, 128, ImageFormat::Png);
    let output = dir.path().join("tiles");

    let err = run(&tiler_config(&input, "2", &output)).await.unwrap_err();
    assert!(matches!(err, TilerError::NotSquare { .. }));
    assert_eq!(err.exit_code(), 5);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_unsupported_extension_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("src.bmp");
    std::fs::write(&input, b"BM\x3a\x00\x00\x00").unwrap();
    let output = dir.path().join("tiles");

    let err = run(&tiler_config(&input, "1", &output)).await.unwrap_err();
    assert!(matches!(err, TilerError::UnknownSourceType(_)));
    assert_eq!(err.exit_code(), 3);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_existing_output_is_not_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "src.png", 64, 64, ImageFormat::Png);
    let output = dir.path().join("tiles");
    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join("notes.txt"), b"keep me").unwrap();

    run(&tiler_config(&input, "1", &output)).await.unwrap();
    assert_eq!(std::fs::read(output.join("notes.txt")).unwrap(), b"keep me");
}

// =============================================================================
// Edge Policies
// =============================================================================

#[tokio::test]
async fn test_uneven_width_stretch() {
    // 100px at zoom 2: raw tiles of 25px, evenly divisible
    // 100px at zoom 3: raw tiles of 13px, last column 9px wide
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "src.png", 100, 100, ImageFormat::Png);
    let output = dir.path().join("tiles");

    let report = run(&tiler_config(&input, "3", &output)).await.unwrap();
    assert_eq!(report.zoom_levels[0].raw_tile_width, 13);
    assert_complete_level(&output, 3, 32);

    let edge = image::open(output.join("3/7/0.png")).unwrap().to_rgba8();
    assert!(edge.pixels().all(|p| p[3] == 255));
}

#[tokio::test]
async fn test_uneven_width_pad() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "src.png", 100, 100, ImageFormat::Png);
    let output = dir.path().join("tiles");

    let mut config = tiler_config(&input, "3", &output);
    config.edge_policy = EdgePolicy::Pad;
    config.resize_width = 26;

    run(&config).await.unwrap();
    assert_complete_level(&output, 3, 26);

    // 9 of 13 raw pixels -> 18 of 26 tile pixels, rest transparent
    let edge = image::open(output.join("3/7/0.png")).unwrap().to_rgba8();
    assert!(edge.get_pixel(10, 10)[3] > 250);
    assert_eq!(edge.get_pixel(22, 10)[3], 0);

    let corner = image::open(output.join("3/7/7.png")).unwrap().to_rgba8();
    assert_eq!(corner.get_pixel(10, 22)[3], 0);
}

#[tokio::test]
async fn test_too_deep_zoom_stretch_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "tiny.png", 10, 10, ImageFormat::Png);
    let output = dir.path().join("tiles");

    let err = run(&tiler_config(&input, "3", &output)).await.unwrap_err();
    assert!(matches!(err, TilerError::TilingFailed { zoom: 3, .. }));
    assert_eq!(err.exit_code(), 6);
    assert!(!output.join("3").exists());
}
