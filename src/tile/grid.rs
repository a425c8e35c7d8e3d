//! Tile grid geometry for one zoom level.
//!
//! At zoom `z` the source is cut into `2^z × 2^z` raw tiles of
//! `ceil(width / 2^z)` pixels. Cells are enumerated row-major, so a flat index
//! `i` sits at `column = i % tile_count`, `row = i / tile_count`:
//!
//! ```text
//! zoom 1:   index 0 -> 0/0.png   index 1 -> 1/0.png
//!           index 2 -> 0/1.png   index 3 -> 1/1.png
//! ```
//!
//! When the width is not a multiple of the tile count, the last column and row
//! are narrower. If the raw width is so coarse that fewer than `tile_count`
//! cells fit, the trailing cells are empty (see [`TileGrid::has_empty_cells`]).

use std::path::{Path, PathBuf};

/// Largest zoom whose tile count fits the grid arithmetic.
pub const MAX_ZOOM: u32 = 30;

/// Largest zoom level slippy-map viewers conventionally support.
pub const MAX_DOCUMENTED_ZOOM: u32 = 18;

/// Tiles per axis at `zoom`, or `None` past [`MAX_ZOOM`].
#[inline]
pub fn tile_count_for_zoom(zoom: u32) -> Option<u32> {
    if zoom > MAX_ZOOM {
        None
    } else {
        Some(1u32 << zoom)
    }
}

#[inline]
fn ceil_div(value: u32, divisor: u32) -> u32 {
    value.div_ceil(divisor)
}

// =============================================================================
// TileCoord / TileRegion
// =============================================================================

/// Position of a tile in the grid, tagged with its row-major flat index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub column: u32,
    pub row: u32,
    pub index: u64,
}

/// Pixel rectangle of a raw tile inside the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

// =============================================================================
// TileGrid
// =============================================================================

/// Grid partition of a square source for one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    zoom: u32,
    tile_count: u32,
    source_width: u32,
    raw_tile_width: u32,
}

impl TileGrid {
    /// Build the grid for `zoom` over a `source_width` square source.
    ///
    /// Returns `None` if the zoom exceeds [`MAX_ZOOM`] or the source is empty.
    pub fn new(zoom: u32, source_width: u32) -> Option<Self> {
        let tile_count = tile_count_for_zoom(zoom)?;
        if source_width == 0 {
            return None;
        }

        Some(Self {
            zoom,
            tile_count,
            source_width,
            raw_tile_width: ceil_div(source_width, tile_count),
        })
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Tiles per axis (`2^zoom`).
    pub fn tile_count(&self) -> u32 {
        self.tile_count
    }

    pub fn source_width(&self) -> u32 {
        self.source_width
    }

    /// Edge of a raw tile before resize: `ceil(width / tile_count)`.
    pub fn raw_tile_width(&self) -> u32 {
        self.raw_tile_width
    }

    /// Total tiles in the grid (`tile_count^2`).
    pub fn total_tiles(&self) -> u64 {
        self.tile_count as u64 * self.tile_count as u64
    }

    /// Number of cells per axis that overlap the source.
    pub fn covered_cells(&self) -> u32 {
        ceil_div(self.source_width, self.raw_tile_width)
    }

    /// Whether some cells fall entirely outside the source.
    pub fn has_empty_cells(&self) -> bool {
        self.covered_cells() < self.tile_count
    }

    /// Whether the grid reaches more than one doubling past the source, so
    /// at least half of each axis would be empty cells.
    pub fn is_overzoomed(&self) -> bool {
        self.covered_cells() as u64 * 2 <= self.tile_count as u64
    }

    /// Whether the last column/row is narrower than the others.
    pub fn has_short_edge(&self) -> bool {
        self.source_width % self.raw_tile_width != 0
    }

    /// Coordinate of the tile at row-major flat index `index`.
    pub fn coord(&self, index: u64) -> TileCoord {
        let count = self.tile_count as u64;
        TileCoord {
            column: (index % count) as u32,
            row: (index / count) as u32,
            index,
        }
    }

    /// All coordinates in row-major order: left to right, top to bottom.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.total_tiles()).map(move |i| self.coord(i))
    }

    /// Source rectangle for a cell, or `None` if the cell is empty.
    pub fn region(&self, coord: TileCoord) -> Option<TileRegion> {
        let span = |cell: u32| -> Option<(u32, u32)> {
            let start = cell as u64 * self.raw_tile_width as u64;
            if start >= self.source_width as u64 {
                return None;
            }
            let end = (start + self.raw_tile_width as u64).min(self.source_width as u64);
            Some((start as u32, (end - start) as u32))
        };

        let (x, width) = span(coord.column)?;
        let (y, height) = span(coord.row)?;
        Some(TileRegion {
            x,
            y,
            width,
            height,
        })
    }

    /// Digits in the total tile count; zero padding for staged names.
    pub fn name_padding(&self) -> usize {
        self.total_tiles().to_string().len()
    }

    /// Zero-padded flat file name for a tile, e.g. `07.png` at zoom 3.
    ///
    /// Lexicographic order of these names equals row-major order.
    pub fn flat_name(&self, coord: TileCoord) -> String {
        format!("{:0width$}.png", coord.index, width = self.name_padding())
    }

    /// `output/zoom`
    pub fn zoom_dir(&self, output: &Path) -> PathBuf {
        output.join(self.zoom.to_string())
    }

    /// `output/zoom/column`
    pub fn column_dir(&self, output: &Path, column: u32) -> PathBuf {
        self.zoom_dir(output).join(column.to_string())
    }

    /// `output/zoom/column/row.png`
    pub fn tile_path(&self, output: &Path, coord: TileCoord) -> PathBuf {
        self.column_dir(output, coord.column)
            .join(format!("{}.png", coord.row))
    }
}
