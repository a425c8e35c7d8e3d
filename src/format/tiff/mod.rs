//! TIFF metadata probing.
//!
//! Only the header and the first IFD are read, which is enough for the
//! dimensions of the full-resolution image.
//!
//! # Key Concepts
//!
//! - **Byte order**: II = little-endian, MM = big-endian. Every multi-byte
//!   value after the first two bytes respects it.
//!
//! - **Classic TIFF vs BigTIFF**: 32-bit vs 64-bit counts and offsets. Both
//!   are handled.

mod ifd;
mod parser;
mod tags;

pub use ifd::{read_tiff_dimensions, IfdEntry};
pub use parser::{is_tiff_header, ByteOrder, TiffHeader, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE};
pub use tags::{FieldType, TiffTag};
