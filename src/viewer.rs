//! Viewer module - generates a Leaflet page for browsing generated tiles.
//!
//! The page sits next to the zoom directories and loads tiles with the
//! relative URL `{z}/{x}/{y}.png`, so the output folder can be served by any
//! static file server.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::TilerError;
use crate::zoom::ZoomRange;

/// File name of the generated viewer page.
pub const VIEWER_FILE_NAME: &str = "index.html";

/// Escape HTML special characters to prevent XSS attacks.
fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Generate a Leaflet page for a tile pyramid.
///
/// # Arguments
///
/// * `title` - Page title, usually the source file name
/// * `zoom` - Zoom levels present in the output folder
/// * `tile_size` - Edge of each tile in pixels (the resize width)
///
/// The map uses `L.CRS.Simple`, where one zoom 0 tile spans `tile_size` map
/// units, so the whole image is bounded by `[[0, 0], [-tile_size, tile_size]]`.
pub fn generate_viewer_html(title: &str, zoom: ZoomRange, tile_size: u32) -> String {
    let escaped_title = html_escape(title);
    let min_zoom = zoom.min();
    let max_zoom = zoom.max();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{escaped_title}</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <style>
        html, body {{
            margin: 0;
            padding: 0;
            height: 100%;
            background: #0f0f0f;
        }}
        #map {{
            width: 100vw;
            height: 100vh;
            background: #0f0f0f;
        }}
    </style>
</head>
<body>
    <div id="map"></div>
    <script>
        (function() {{
            const tileSize = {tile_size};
            const bounds = L.latLngBounds([0, 0], [-tileSize, tileSize]);

            const tiles = L.tileLayer("{{z}}/{{x}}/{{y}}.png", {{
                tileSize: tileSize,
                minZoom: {min_zoom},
                maxZoom: {max_zoom},
                bounds: bounds,
                noWrap: true
            }});

            const map = L.map("map", {{
                crs: L.CRS.Simple,
                minZoom: {min_zoom},
                maxZoom: {max_zoom},
                maxBounds: bounds.pad(0.25),
                layers: [tiles]
            }});

            map.fitBounds(bounds);
        }})();
    </script>
</body>
</html>"##
    )
}

/// Path of the viewer page inside `output_folder`.
pub fn viewer_path(output_folder: &Path) -> PathBuf {
    output_folder.join(VIEWER_FILE_NAME)
}

/// Write the viewer page into `output_folder`, replacing any previous one.
pub async fn write_viewer(
    output_folder: &Path,
    title: &str,
    zoom: ZoomRange,
    tile_size: u32,
) -> Result<PathBuf, TilerError> {
    let path = viewer_path(output_folder);
    let html = generate_viewer_html(title, zoom, tile_size);

    tokio::fs::write(&path, html)
        .await
        .map_err(|e| TilerError::io(&path, e))?;

    info!("Wrote viewer to {}", path.display());
    Ok(path)
}
