//! The source image: probed metadata plus lazily decoded pixels.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, ImageReader};
use tracing::{debug, info, warn};

use crate::error::{TileError, TilerError};
use crate::format::{probe_file, ImageProbe, SourceFormat};

/// A square source image.
///
/// Created by [`SourceImage::probe`], which reads only header bytes. Pixels
/// are decoded once by [`SourceImage::decode`] and shared by every zoom level.
#[derive(Debug)]
pub struct SourceImage {
    path: PathBuf,
    probe: ImageProbe,
    pixels: Option<Arc<DynamicImage>>,
}

impl SourceImage {
    /// Read dimensions and format from the file header.
    ///
    /// Fails with the "unknown source image type" category for unsupported
    /// extensions (before the file is opened) and "could not parse source
    /// image dims" for unreadable headers.
    pub async fn probe(path: impl AsRef<Path>) -> Result<Self, TilerError> {
        let path = path.as_ref();
        info!("Getting source image dimensions...");
        let probe = probe_file(path).await?;
        info!("- {} x {} pixels ({})", probe.width, probe.height, probe.format.name());

        Ok(Self {
            path: path.to_path_buf(),
            probe,
            pixels: None,
        })
    }

    /// Check the source can be tiled.
    ///
    /// Non-square sources are fatal. Widths that are not a power of two only
    /// warn, since edge tiles will then be undersized.
    pub fn validate(&self) -> Result<(), TilerError> {
        if !self.width().is_power_of_two() {
            warn!("WARNING: Source image dims should be power of 2! Continuing anyway...");
        }

        if self.width() != self.height() {
            return Err(TilerError::NotSquare {
                width: self.width(),
                height: self.height(),
            });
        }

        Ok(())
    }

    /// Decode pixel data on a blocking worker, once.
    ///
    /// The decoded size must match the probed size.
    pub async fn decode(&mut self) -> Result<Arc<DynamicImage>, TilerError> {
        if let Some(pixels) = &self.pixels {
            return Ok(Arc::clone(pixels));
        }

        debug!("Decoding {}", self.path.display());
        let path = self.path.clone();
        let format = self.probe.format;

        let decoded = tokio::task::spawn_blocking(move || decode_file(&path, format))
            .await
            .map_err(|e| TileError::Worker(e.to_string()))
            .and_then(|result| result)
            .map_err(|source| TilerError::Decode {
                path: self.path.clone(),
                source,
            })?;

        if (decoded.width(), decoded.height()) != (self.width(), self.height()) {
            return Err(TilerError::Decode {
                path: self.path.clone(),
                source: TileError::DecodeError {
                    message: format!(
                        "decoded {}x{} but header says {}x{}",
                        decoded.width(),
                        decoded.height(),
                        self.width(),
                        self.height()
                    ),
                },
            });
        }

        let pixels = Arc::new(decoded);
        self.pixels = Some(Arc::clone(&pixels));
        Ok(pixels)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> u32 {
        self.probe.width
    }

    pub fn height(&self) -> u32 {
        self.probe.height
    }

    pub fn format(&self) -> SourceFormat {
        self.probe.format
    }
}

/// Decode a whole image file with the format already known.
///
/// The `image` crate's default allocation limit would refuse the very large
/// sources this tool exists for, so limits are lifted.
fn decode_file(path: &Path, format: SourceFormat) -> Result<DynamicImage, TileError> {
    let decode_error = |message: String| TileError::DecodeError { message };

    let mut reader = ImageReader::open(path).map_err(|e| decode_error(e.to_string()))?;
    reader.set_format(format.image_format());
    reader.no_limits();
    reader.decode().map_err(|e| decode_error(e.to_string()))
}
