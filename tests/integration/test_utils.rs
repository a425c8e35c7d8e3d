//! Test utilities for integration tests.
//!
//! This module provides a tracking range reader, synthetic source images in
//! every supported format, and helpers for inspecting a generated tile tree.

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use slippy_tiler::error::IoError;
use slippy_tiler::io::RangeReader;
use slippy_tiler::{Config, EdgePolicy, OutputFormat};

// =============================================================================
// Mock Range Reader with Request Tracking
// =============================================================================

/// A mock range reader that counts read requests.
///
/// Used to check how many underlying reads a probe costs through the block
/// cache.
#[derive(Clone)]
pub struct TrackingMockReader {
    data: Bytes,
    identifier: String,
    request_count: Arc<AtomicUsize>,
}

impl TrackingMockReader {
    pub fn new(data: Vec<u8>, identifier: impl Into<String>) -> Self {
        Self {
            data: Bytes::from(data),
            identifier: identifier.into(),
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RangeReader for TrackingMockReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        let start = offset as usize;
        let end = start + len;
        if end > self.data.len() {
            return Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                size: self.data.len() as u64,
            });
        }
        Ok(self.data.slice(start..end))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// Synthetic Sources
// =============================================================================

/// RGB image whose colour identifies the quadrant (at zoom 1) a pixel is in.
pub fn quadrant_image(width: u32, height: u32) -> RgbImage {
    let (half_w, half_h) = (width / 2, height / 2);
    RgbImage::from_fn(width, height, |x, y| match (x < half_w, y < half_h) {
        (true, true) => Rgb([255, 0, 0]),
        (false, true) => Rgb([0, 255, 0]),
        (true, false) => Rgb([0, 0, 255]),
        (false, false) => Rgb([255, 255, 255]),
    })
}

/// Write a quadrant image at `dir/name` in the format implied by `format`.
pub fn write_source(dir: &Path, name: &str, width: u32, height: u32, format: ImageFormat) -> PathBuf {
    let path = dir.join(name);
    quadrant_image(width, height)
        .save_with_format(&path, format)
        .unwrap();
    path
}

/// Encode a quadrant image as baseline JPEG.
pub fn create_test_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let img = quadrant_image(width, height);
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.encode_image(&img).unwrap();
    buf
}

// =============================================================================
// Header-only TIFF Builder
// =============================================================================

#[derive(Clone, Copy)]
pub enum ByteOrderType {
    LittleEndian,
    BigEndian,
}

/// Build a TIFF whose first IFD holds only ImageWidth and ImageLength.
///
/// `field_type` is 3 (SHORT), 4 (LONG) or 16 (LONG8, BigTIFF only). The
/// IFD is placed after `gap` zero bytes to push it past the first cache
/// block when needed.
pub fn create_tiff_header(
    byte_order: ByteOrderType,
    bigtiff: bool,
    width: u32,
    height: u32,
    field_type: u16,
    gap: usize,
) -> Vec<u8> {
    let mut data = Vec::new();
    let put = |data: &mut Vec<u8>, value: u64, size: usize| match byte_order {
        ByteOrderType::LittleEndian => data.extend(&value.to_le_bytes()[..size]),
        ByteOrderType::BigEndian => data.extend(&value.to_be_bytes()[8 - size..]),
    };

    match byte_order {
        ByteOrderType::LittleEndian => data.extend(b"II"),
        ByteOrderType::BigEndian => data.extend(b"MM"),
    }

    let header_size = if bigtiff { 16 } else { 8 };
    let ifd_offset = (header_size + gap) as u64;
    if bigtiff {
        put(&mut data, 43, 2);
        put(&mut data, 8, 2);
        put(&mut data, 0, 2);
        put(&mut data, ifd_offset, 8);
    } else {
        put(&mut data, 42, 2);
        put(&mut data, ifd_offset, 4);
    }
    data.resize(data.len() + gap, 0);

    let value_size = match field_type {
        3 => 2,
        4 => 4,
        _ => 8,
    };
    // Entry value field is 4 bytes (TIFF) or 8 bytes (BigTIFF), left-aligned
    let field_size = if bigtiff { 8 } else { 4 };

    let entries = [(256u16, width), (257u16, height)];
    if bigtiff {
        put(&mut data, entries.len() as u64, 8);
    } else {
        put(&mut data, entries.len() as u64, 2);
    }
    for (tag, value) in entries {
        put(&mut data, tag as u64, 2);
        put(&mut data, field_type as u64, 2);
        if bigtiff {
            put(&mut data, 1, 8);
        } else {
            put(&mut data, 1, 4);
        }
        put(&mut data, value as u64, value_size);
        data.resize(data.len() + field_size - value_size, 0);
    }

    // Next IFD offset
    put(&mut data, 0, if bigtiff { 8 } else { 4 });
    data
}

// =============================================================================
// Run Helpers
// =============================================================================

/// Quiet text-mode config with a small tile size.
pub fn tiler_config(input: &Path, zoom: &str, output: &Path) -> Config {
    Config {
        input_file: input.to_path_buf(),
        zoom_level: zoom.to_string(),
        output_folder: output.to_path_buf(),
        resize_width: 32,
        edge_policy: EdgePolicy::Stretch,
        format: OutputFormat::Text,
        viewer: false,
        quiet: true,
        verbose: false,
    }
}

/// Sorted names of the entries directly under `dir`.
pub fn entry_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Every file under `dir` as a path relative to it, sorted.
pub fn all_files(dir: &Path) -> Vec<PathBuf> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                out.push(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }

    let mut files = Vec::new();
    walk(dir, dir, &mut files);
    files.sort();
    files
}

/// Assert that `output/zoom` holds a complete `2^zoom` square grid of
/// `tile_size` square PNGs.
pub fn assert_complete_level(output: &Path, zoom: u32, tile_size: u32) {
    let count = 1u32 << zoom;
    let level = output.join(zoom.to_string());

    let mut expected_columns: Vec<String> = (0..count).map(|c| c.to_string()).collect();
    expected_columns.sort();
    assert_eq!(entry_names(&level), expected_columns, "columns at zoom {}", zoom);

    let mut expected_rows: Vec<String> = (0..count).map(|r| format!("{}.png", r)).collect();
    expected_rows.sort();

    for column in 0..count {
        let column_dir = level.join(column.to_string());
        assert_eq!(entry_names(&column_dir), expected_rows, "rows in {}", column_dir.display());

        for row in 0..count {
            let tile = image::open(column_dir.join(format!("{}.png", row))).unwrap();
            assert_eq!(
                (tile.width(), tile.height()),
                (tile_size, tile_size),
                "size of {}/{}/{}",
                zoom,
                column,
                row
            );
        }
    }
}

/// Centre pixel of a tile as RGB.
pub fn centre_rgb(path: &Path) -> [u8; 3] {
    let tile = image::open(path).unwrap().to_rgb8();
    let (w, h) = tile.dimensions();
    tile.get_pixel(w / 2, h / 2).0
}

/// Whether two colours differ by at most a few levels per channel.
pub fn rgb_near(a: [u8; 3], b: [u8; 3], tolerance: u8) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= tolerance)
}

// =============================================================================
// Validation Helpers
// =============================================================================

/// Check if data starts with the PNG signature.
pub fn is_png_magic(data: &[u8]) -> bool {
    data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
}
