//! # slippy-tiler
//!
//! Cuts one large square image into a slippy-map tile pyramid laid out as
//! `{zoom}/{x}/{y}.png`, ready for Leaflet, MapBox and similar viewers.
//!
//! ## Features
//!
//! - **Header-only probing**: Dimensions come from PNG, JPEG and TIFF headers
//!   read through a block-cached range reader, before any pixels are decoded
//! - **Zoom ranges**: Generate one level (`3`) or several (`2-6`) per run
//! - **Tagged placement**: Every tile is written to the cell it was cut from,
//!   and the tile count is checked before anything lands in the output tree
//! - **Edge policies**: Stretch or transparently pad undersized edge tiles
//! - **Viewer**: Optional Leaflet `index.html` next to the tiles
//!
//! ## Architecture
//!
//! - [`io`] - Range reader abstraction and block caching
//! - [`mod@format`] - Format detection and header dimension parsers
//! - [`source`] - Probed and decoded source image
//! - [`tile`] - Grid geometry, PNG encoding and per-level generation
//! - [`zoom`] - Zoom argument parsing
//! - [`runner`] - Whole-run orchestration and report
//! - [`viewer`] - Leaflet page generation
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use slippy_tiler::{run, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::parse_from(["slippy-tiler", "world.png", "0-4", "tiles"]);
//!     let report = run(&config).await.unwrap();
//!     println!("{} levels written", report.zoom_levels.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod runner;
pub mod source;
pub mod tile;
pub mod viewer;
pub mod zoom;

// Re-export commonly used types
pub use config::{Config, EdgePolicy, OutputFormat, DEFAULT_RESIZE_WIDTH, MAX_RESIZE_WIDTH};
pub use error::{IoError, ProbeError, TiffError, TileError, TilerError};
pub use format::{probe_dimensions, probe_file, ImageProbe, SourceFormat};
pub use io::{BlockCache, FileRangeReader, MemoryRangeReader, RangeReader};
pub use runner::{run, RunReport};
pub use source::SourceImage;
pub use tile::{
    PngTileEncoder, TileCoord, TileGenerator, TileGrid, TileRegion, ZoomReport,
    MAX_DOCUMENTED_ZOOM, MAX_ZOOM,
};
pub use viewer::{generate_viewer_html, write_viewer};
pub use zoom::ZoomRange;
