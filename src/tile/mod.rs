//! Tile pyramid generation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             TileGenerator               │
//! │  one zoom level -> output/zoom/x/y.png  │
//! └───────────┬─────────────────┬───────────┘
//!             │                 │
//!             ▼                 ▼
//! ┌───────────────────┐ ┌───────────────────┐
//! │     TileGrid      │ │  PngTileEncoder   │
//! │  cells, regions,  │ │  crop -> resize   │
//! │  names, paths     │ │  -> PNG bytes     │
//! └───────────────────┘ └───────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileGrid`]: Geometry of one zoom level (tile count, raw width, regions)
//! - [`TileCoord`]: Column/row of a cell tagged with its row-major index
//! - [`PngTileEncoder`]: Produces `resize_width` square PNG tiles per [`crate::EdgePolicy`]
//! - [`TileGenerator`]: Stages, checks and places all tiles of a level

mod encoder;
mod generator;
mod grid;

pub use encoder::{encode_png, PngTileEncoder, RESIZE_FILTER};
pub use generator::{StagedTile, TileGenerator, ZoomReport, STAGING_PREFIX};
pub use grid::{
    tile_count_for_zoom, TileCoord, TileGrid, TileRegion, MAX_DOCUMENTED_ZOOM, MAX_ZOOM,
};
