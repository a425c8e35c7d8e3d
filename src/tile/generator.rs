//! Tile generation for one zoom level.
//!
//! A level is produced in two passes:
//!
//! ```text
//! ┌──────────────────────────────┐     ┌──────────────────────────────┐
//! │  crop + resize + encode      │     │  placement                   │
//! │  (blocking worker)           │ ──▶ │  staging/07.png              │
//! │  -> staging/{index}.png      │     │    -> zoom/7/0.png (tagged)  │
//! └──────────────────────────────┘     └──────────────────────────────┘
//! ```
//!
//! The staging directory lives inside the output folder so placement is a
//! plain rename. Every staged file carries the [`TileCoord`] it was cut from,
//! and the staged count is checked against `tile_count^2` before anything is
//! moved into the `zoom/x/y.png` tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::DynamicImage;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::encoder::PngTileEncoder;
use super::grid::{TileCoord, TileGrid};
use crate::config::EdgePolicy;
use crate::error::{TileError, TilerError};

/// Prefix of the per-level staging directory inside the output folder.
pub const STAGING_PREFIX: &str = ".staging-";

/// Summary of one generated zoom level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoomReport {
    pub zoom: u32,
    pub tile_count: u32,
    pub raw_tile_width: u32,
    pub tiles_written: u64,
    pub path: PathBuf,
}

/// A tile written to the staging directory, tagged with its grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedTile {
    pub coord: TileCoord,
    pub path: PathBuf,
}

/// Writes zoom levels of a decoded source into an output folder.
#[derive(Debug, Clone)]
pub struct TileGenerator {
    output_folder: PathBuf,
    encoder: PngTileEncoder,
}

impl TileGenerator {
    pub fn new(output_folder: impl Into<PathBuf>, encoder: PngTileEncoder) -> Self {
        Self {
            output_folder: output_folder.into(),
            encoder,
        }
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    /// Staging directory used while generating `zoom`.
    pub fn staging_dir(&self, zoom: u32) -> PathBuf {
        self.output_folder.join(format!("{}{}", STAGING_PREFIX, zoom))
    }

    /// Generate every tile of `zoom` into `output/zoom/x/y.png`.
    ///
    /// Existing tiles of this level are overwritten; other levels are left
    /// alone. On failure the staging directory is removed.
    pub async fn generate(
        &self,
        pixels: Arc<DynamicImage>,
        zoom: u32,
    ) -> Result<ZoomReport, TilerError> {
        let tiling_failed = |source: TileError| TilerError::TilingFailed { zoom, source };

        let grid = TileGrid::new(zoom, pixels.width()).ok_or_else(|| {
            tiling_failed(TileError::InvalidGrid {
                zoom,
                source_width: pixels.width(),
            })
        })?;

        info!("Zoom level {} = {} tiles", zoom, grid.total_tiles());
        info!("- Raw tile width: {} pixels", grid.raw_tile_width());

        if grid.has_empty_cells() {
            let empty = TileError::EmptyCells {
                tile_count: grid.tile_count(),
                raw_width: grid.raw_tile_width(),
                source_width: grid.source_width(),
            };
            match self.encoder.edge_policy() {
                EdgePolicy::Stretch => return Err(tiling_failed(empty)),
                EdgePolicy::Pad if grid.is_overzoomed() => {
                    return Err(tiling_failed(TileError::Overzoomed {
                        tile_count: grid.tile_count(),
                        covered_cells: grid.covered_cells(),
                    }))
                }
                EdgePolicy::Pad => warn!("{}; padding with blank tiles", empty),
            }
        }

        tokio::fs::create_dir_all(&self.output_folder)
            .await
            .map_err(|e| TilerError::io(&self.output_folder, e))?;

        let staging = self.staging_dir(zoom);
        reset_dir(&staging).await?;

        let result = self.stage_and_place(pixels, grid, &staging).await;

        if let Err(e) = tokio::fs::remove_dir_all(&staging).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove {}: {}", staging.display(), e);
            }
        }

        result
    }

    async fn stage_and_place(
        &self,
        pixels: Arc<DynamicImage>,
        grid: TileGrid,
        staging: &Path,
    ) -> Result<ZoomReport, TilerError> {
        let zoom = grid.zoom();

        info!("Cropping and resizing tiles...");
        let encoder = self.encoder;
        let worker_dir = staging.to_path_buf();
        let staged = tokio::task::spawn_blocking(move || {
            stage_tiles(&pixels, &grid, &encoder, &worker_dir)
        })
        .await
        .map_err(|e| TilerError::TilingFailed {
            zoom,
            source: TileError::Worker(e.to_string()),
        })??;

        check_staged_count(&grid, staged.len())
            .map_err(|source| TilerError::TilingFailed { zoom, source })?;

        info!("Placing tiles...");
        for column in 0..grid.tile_count() {
            let dir = grid.column_dir(&self.output_folder, column);
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| TilerError::io(&dir, e))?;
        }

        for tile in &staged {
            let target = grid.tile_path(&self.output_folder, tile.coord);
            tokio::fs::rename(&tile.path, &target)
                .await
                .map_err(|e| TilerError::io(&target, e))?;
        }

        debug!("Placed {} tiles for zoom {}", staged.len(), zoom);

        Ok(ZoomReport {
            zoom,
            tile_count: grid.tile_count(),
            raw_tile_width: grid.raw_tile_width(),
            tiles_written: staged.len() as u64,
            path: grid.zoom_dir(&self.output_folder),
        })
    }
}

/// Every cell of the grid must have been staged before placement.
fn check_staged_count(grid: &TileGrid, staged: usize) -> Result<(), TileError> {
    if staged as u64 != grid.total_tiles() {
        return Err(TileError::CountMismatch {
            expected: grid.total_tiles(),
            produced: staged as u64,
        });
    }
    Ok(())
}

/// Remove any leftover directory from an interrupted run and recreate it.
async fn reset_dir(dir: &Path) -> Result<(), TilerError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => debug!("Removed stale {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(TilerError::io(dir, e)),
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| TilerError::io(dir, e))
}

/// Cut, resize and encode every cell in row-major order into `staging`.
///
/// Runs on a blocking thread.
fn stage_tiles(
    pixels: &DynamicImage,
    grid: &TileGrid,
    encoder: &PngTileEncoder,
    staging: &Path,
) -> Result<Vec<StagedTile>, TilerError> {
    let mut staged = Vec::new();

    for coord in grid.coords() {
        let bytes = encoder
            .encode(pixels, grid, grid.region(coord))
            .map_err(|source| TilerError::TilingFailed {
                zoom: grid.zoom(),
                source,
            })?;

        let path = staging.join(grid.flat_name(coord));
        std::fs::write(&path, bytes).map_err(|e| TilerError::io(&path, e))?;
        staged.push(StagedTile { coord, path });
    }

    Ok(staged)
}
