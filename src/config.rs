//! Command-line configuration for slippy-tiler.
//!
//! Options can also come from environment variables with the `TILER_` prefix:
//!
//! - `TILER_RESIZE_WIDTH` - Tile edge in pixels (default: 256)
//! - `TILER_EDGE_POLICY` - `stretch` or `pad` for undersized edge tiles
//!
//! # Example
//!
//! ```text
//! slippy-tiler world.png 2-6 tiles -w 512 --viewer
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::error::TilerError;
use crate::zoom::ZoomRange;

// =============================================================================
// Default Values
// =============================================================================

/// Default edge length of generated tiles.
pub const DEFAULT_RESIZE_WIDTH: u32 = 256;

/// Largest accepted tile edge.
pub const MAX_RESIZE_WIDTH: u32 = 16_384;

// =============================================================================
// Value Enums
// =============================================================================

/// How raw tiles smaller than the grid cell are normalized.
///
/// Only the last column and row can be undersized, and only when the source
/// width is not a multiple of the tile count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Resize every raw tile to the full square, distorting short edge tiles
    #[default]
    Stretch,

    /// Keep source scale and fill the rest of the tile with transparency
    Pad,
}

/// Final report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Progress lines only
    #[default]
    Text,

    /// JSON run summary on stdout when finished
    Json,
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// Takes a large image as the input, outputs map tiles at the appropriate
/// size and file structure for use in frameworks like leaflet.js or MapBox.
///
/// Tiles are written as OUTPUT_FOLDER/zoom/x/y.png. Running again with a new
/// zoom level adds it next to the existing ones.
#[derive(Parser, Debug, Clone)]
#[command(name = "slippy-tiler")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Large image file to split (JPG, PNG, or TIFF).
    pub input_file: PathBuf,

    /// Zoom level(s) to generate (0 to 18); either integer or range (ex: 2-6).
    pub zoom_level: String,

    /// Folder to write tiles to (created if it does not exist).
    pub output_folder: PathBuf,

    /// Dimension in pixels of the output tiles.
    #[arg(
        short = 'w',
        long = "resize_width",
        visible_alias = "resize-width",
        default_value_t = DEFAULT_RESIZE_WIDTH,
        env = "TILER_RESIZE_WIDTH"
    )]
    pub resize_width: u32,

    /// Policy for undersized tiles on the right and bottom edges.
    #[arg(long, value_enum, default_value_t = EdgePolicy::Stretch, env = "TILER_EDGE_POLICY")]
    pub edge_policy: EdgePolicy,

    /// Report format printed after the run.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write a Leaflet index.html into the output folder.
    #[arg(long, default_value_t = false)]
    pub viewer: bool,

    /// Suppress all progress output (useful inside larger scripts).
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false, conflicts_with = "quiet")]
    pub verbose: bool,
}

impl Config {
    /// Validate option values that clap cannot check on its own.
    pub fn validate(&self) -> Result<(), String> {
        if self.resize_width == 0 {
            return Err("resize_width must be greater than 0".to_string());
        }

        if self.resize_width > MAX_RESIZE_WIDTH {
            return Err(format!(
                "resize_width must be at most {}",
                MAX_RESIZE_WIDTH
            ));
        }

        if self.output_folder.as_os_str().is_empty() {
            return Err("output_folder must not be empty".to_string());
        }

        Ok(())
    }

    /// Parse the zoom argument.
    pub fn zoom_range(&self) -> Result<ZoomRange, TilerError> {
        self.zoom_level.parse()
    }
}
