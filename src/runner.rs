//! Run orchestration: probe the source once, then generate each zoom level.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Config, EdgePolicy};
use crate::error::TilerError;
use crate::format::SourceFormat;
use crate::source::SourceImage;
use crate::tile::{PngTileEncoder, TileGenerator, ZoomReport, MAX_DOCUMENTED_ZOOM};
use crate::viewer::write_viewer;

/// Summary of a completed run, printed with `--format json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub source: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: SourceFormat,
    pub resize_width: u32,
    pub edge_policy: EdgePolicy,
    pub output_folder: PathBuf,
    pub zoom_levels: Vec<ZoomReport>,
    pub viewer: Option<PathBuf>,
}

/// Generate every requested zoom level.
///
/// Checks run in order: options, zoom argument, source type and dimensions,
/// squareness. Nothing is written to the output folder until all of them
/// pass. A failing level stops the run; levels already generated stay on disk.
pub async fn run(config: &Config) -> Result<RunReport, TilerError> {
    config.validate().map_err(TilerError::Config)?;
    let zoom = config.zoom_range()?;

    info!("GENERATING SLIPPY-MAP TILES");
    info!("- Input: {}", config.input_file.display());
    info!("- Output: {}", config.output_folder.display());
    info!("- Zoom: {}", zoom);

    if zoom.max() > MAX_DOCUMENTED_ZOOM {
        warn!(
            "Zoom {} is beyond the usual slippy-map range of 0-{}",
            zoom.max(),
            MAX_DOCUMENTED_ZOOM
        );
    }

    let mut source = SourceImage::probe(&config.input_file).await?;
    source.validate()?;
    let pixels = source.decode().await?;

    let encoder = PngTileEncoder::new(config.resize_width, config.edge_policy);
    let generator = TileGenerator::new(&config.output_folder, encoder);

    let mut zoom_levels = Vec::with_capacity(zoom.level_count());
    for level in zoom.levels() {
        zoom_levels.push(generator.generate(pixels.clone(), level).await?);
    }

    let viewer = if config.viewer {
        let title = source
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Some(write_viewer(&config.output_folder, &title, zoom, encoder.resize_width()).await?)
    } else {
        None
    };

    info!("FINISHED!");

    Ok(RunReport {
        source: source.path().to_path_buf(),
        width: source.width(),
        height: source.height(),
        format: source.format(),
        resize_width: encoder.resize_width(),
        edge_policy: encoder.edge_policy(),
        output_folder: config.output_folder.clone(),
        zoom_levels,
        viewer,
    })
}
