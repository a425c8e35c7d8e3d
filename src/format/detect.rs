//! Source format detection and metadata-only dimension probing.
//!
//! The format is chosen from the file extension, then confirmed against the
//! header magic before the per-format parser runs:
//!
//! - **JPEG**: `.jpg`, `.jpeg`
//! - **PNG**: `.png`
//! - **TIFF**: `.tif`, `.tiff` (classic and BigTIFF)
//!
//! Anything else is rejected before the file is opened.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use super::jpeg::{is_jpeg_header, read_jpeg_dimensions};
use super::png::{is_png_header, read_png_dimensions};
use super::tiff::{is_tiff_header, read_tiff_dimensions};
use crate::error::ProbeError;
use crate::io::{BlockCache, FileRangeReader, RangeReader};

/// Bytes read up front for the magic check.
const MAGIC_BYTES: usize = 8;

// =============================================================================
// SourceFormat
// =============================================================================

/// Supported source image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Jpeg,
    Png,
    Tiff,
}

impl SourceFormat {
    /// Pick the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ProbeError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => Ok(SourceFormat::Jpeg),
            Some("png") => Ok(SourceFormat::Png),
            Some("tif") | Some("tiff") => Ok(SourceFormat::Tiff),
            _ => Err(ProbeError::UnknownType {
                path: path.display().to_string(),
            }),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "JPEG",
            SourceFormat::Png => "PNG",
            SourceFormat::Tiff => "TIFF",
        }
    }

    /// Matching decoder format in the `image` crate.
    pub const fn image_format(&self) -> image::ImageFormat {
        match self {
            SourceFormat::Jpeg => image::ImageFormat::Jpeg,
            SourceFormat::Png => image::ImageFormat::Png,
            SourceFormat::Tiff => image::ImageFormat::Tiff,
        }
    }

    /// Whether the leading bytes carry this format's magic.
    pub fn matches_magic(&self, bytes: &[u8]) -> bool {
        match self {
            SourceFormat::Jpeg => is_jpeg_header(bytes),
            SourceFormat::Png => is_png_header(bytes),
            SourceFormat::Tiff => is_tiff_header(bytes),
        }
    }
}

// =============================================================================
// Probing
// =============================================================================

/// Result of a metadata probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageProbe {
    pub width: u32,
    pub height: u32,
    pub format: SourceFormat,
}

/// Probe `(width, height)` of an already-opened source.
///
/// Reads only header bytes; pixel data is never decoded.
pub async fn probe_dimensions<R: RangeReader>(
    reader: &R,
    format: SourceFormat,
) -> Result<ImageProbe, ProbeError> {
    let magic_len = (MAGIC_BYTES as u64).min(reader.size()) as usize;
    let magic = reader.read_exact_at(0, magic_len).await?;
    if !format.matches_magic(&magic) {
        return Err(ProbeError::Dimensions {
            format: format.name(),
            reason: format!(
                "{} does not start with a {} signature",
                reader.identifier(),
                format.name()
            ),
        });
    }

    let (width, height) = match format {
        SourceFormat::Jpeg => read_jpeg_dimensions(reader).await?,
        SourceFormat::Png => read_png_dimensions(reader).await?,
        SourceFormat::Tiff => read_tiff_dimensions(reader).await?,
    };

    debug!(
        "Probed {} as {} {}x{}",
        reader.identifier(),
        format.name(),
        width,
        height
    );

    Ok(ImageProbe {
        width,
        height,
        format,
    })
}

/// Probe a file on disk.
///
/// The extension is checked first, so an unsupported file is rejected without
/// touching the filesystem.
pub async fn probe_file(path: &Path) -> Result<ImageProbe, ProbeError> {
    let format = SourceFormat::from_path(path)?;
    let reader = BlockCache::new(FileRangeReader::open(path).await?);
    probe_dimensions(&reader, format).await
}
