//! Metadata probes for source images.
//!
//! Each supported format has a header parser that reads the image size from
//! a handful of bytes, so multi-gigabyte sources can be validated before any
//! pixel is decoded.
//!
//! Use [`detect::probe_file`] to pick the format from the extension and read
//! its dimensions.

pub mod detect;
pub mod jpeg;
pub mod png;
pub mod tiff;

pub use detect::{probe_dimensions, probe_file, ImageProbe, SourceFormat};
pub use jpeg::read_jpeg_dimensions;
pub use png::read_png_dimensions;
pub use tiff::read_tiff_dimensions;
