//! PNG tile encoder.
//!
//! Cuts one raw tile out of the decoded source, normalizes it to a
//! `resize_width` square and encodes it as PNG.
//!
//! # Design Decisions
//!
//! - **Always resize**: Every tile leaves the encoder at exactly
//!   `resize_width × resize_width`, whatever the source size.
//!
//! - **Edge tiles**: Short right/bottom tiles are either stretched to the full
//!   square or scaled like their neighbours and padded with transparency,
//!   per [`EdgePolicy`].
//!
//! - **One filter**: Every resize uses [`RESIZE_FILTER`].

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

use super::grid::{TileGrid, TileRegion};
use crate::config::{EdgePolicy, DEFAULT_RESIZE_WIDTH};
use crate::error::TileError;

/// Resampling filter used for every tile.
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

// =============================================================================
// PNG Encoder
// =============================================================================

/// Crops, resizes and encodes tiles.
///
/// # Example
///
/// ```ignore
/// use slippy_tiler::tile::{PngTileEncoder, TileGrid};
/// use slippy_tiler::EdgePolicy;
///
/// let encoder = PngTileEncoder::new(256, EdgePolicy::Stretch);
/// let grid = TileGrid::new(2, source.width()).unwrap();
/// let png = encoder.encode(&source, &grid, grid.region(grid.coord(0)))?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngTileEncoder {
    resize_width: u32,
    edge_policy: EdgePolicy,
}

impl Default for PngTileEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_WIDTH, EdgePolicy::default())
    }
}

impl PngTileEncoder {
    /// Create an encoder for `resize_width` square tiles.
    ///
    /// A zero width is bumped to 1.
    pub fn new(resize_width: u32, edge_policy: EdgePolicy) -> Self {
        Self {
            resize_width: resize_width.max(1),
            edge_policy,
        }
    }

    pub fn resize_width(&self) -> u32 {
        self.resize_width
    }

    pub fn edge_policy(&self) -> EdgePolicy {
        self.edge_policy
    }

    /// Produce the resized tile for one grid cell.
    ///
    /// `region` is `None` for cells outside the source; those become fully
    /// transparent tiles under the pad policy. Under stretch there is nothing
    /// to stretch, so an empty cell is an error.
    pub fn render(
        &self,
        source: &DynamicImage,
        grid: &TileGrid,
        region: Option<TileRegion>,
    ) -> Result<DynamicImage, TileError> {
        let size = self.resize_width;

        let region = match (region, self.edge_policy) {
            (Some(region), _) => region,
            (None, EdgePolicy::Pad) => {
                return Ok(DynamicImage::ImageRgba8(RgbaImage::new(size, size)))
            }
            (None, EdgePolicy::Stretch) => {
                return Err(TileError::EmptyCells {
                    tile_count: grid.tile_count(),
                    raw_width: grid.raw_tile_width(),
                    source_width: grid.source_width(),
                })
            }
        };

        let raw = source.crop_imm(region.x, region.y, region.width, region.height);

        let full_cell =
            region.width == grid.raw_tile_width() && region.height == grid.raw_tile_width();
        if full_cell || self.edge_policy == EdgePolicy::Stretch {
            return Ok(raw.resize_exact(size, size, RESIZE_FILTER));
        }

        // Pad: scale by the same factor as a full cell, anchor top-left
        let scaled_width = scale_edge(region.width, grid.raw_tile_width(), size);
        let scaled_height = scale_edge(region.height, grid.raw_tile_width(), size);
        let scaled = raw
            .resize_exact(scaled_width, scaled_height, RESIZE_FILTER)
            .to_rgba8();

        let mut canvas = RgbaImage::new(size, size);
        imageops::overlay(&mut canvas, &scaled, 0, 0);
        Ok(DynamicImage::ImageRgba8(canvas))
    }

    /// Render one cell and encode it as PNG bytes.
    pub fn encode(
        &self,
        source: &DynamicImage,
        grid: &TileGrid,
        region: Option<TileRegion>,
    ) -> Result<Vec<u8>, TileError> {
        let tile = self.render(source, grid, region)?;
        encode_png(&tile)
    }
}

/// Scale a partial edge length so it keeps the full cell's pixel ratio.
///
/// Rounds to nearest and never returns 0.
fn scale_edge(edge: u32, raw_tile_width: u32, resize_width: u32) -> u32 {
    let raw = raw_tile_width.max(1) as u64;
    let scaled = (edge as u64 * resize_width as u64 + raw / 2) / raw;
    scaled.clamp(1, resize_width as u64) as u32
}

/// Encode an image as PNG.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, TileError> {
    let mut output = Vec::new();
    image
        .write_with_encoder(PngEncoder::new(&mut output))
        .map_err(|e| TileError::EncodeError {
            message: e.to_string(),
        })?;
    Ok(output)
}

// =============================================================================
// Tests
// =============================================================================
