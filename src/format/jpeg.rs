//! JPEG dimension probing.
//!
//! The frame size lives in the Start Of Frame segment, which follows any
//! number of APPn/DQT/DHT/COM segments. We walk segment headers from SOI
//! until the first SOFn and read:
//!
//! ```text
//! FF Cn | length(2) | precision(1) | height(2) | width(2) | ...
//! ```
//!
//! Only segment headers are read, never entropy-coded data.

use crate::error::ProbeError;
use crate::io::{read_u16_be, RangeReader};

// =============================================================================
// JPEG Markers
// =============================================================================

/// Start Of Image marker
pub const SOI: [u8; 2] = [0xFF, 0xD8];

/// End Of Image marker
pub const EOI: u8 = 0xD9;

/// Start Of Scan marker
pub const SOS: u8 = 0xDA;

/// Define Huffman Table marker (shares the C0-CF range with SOFn)
pub const DHT: u8 = 0xC4;

/// JPG extension marker (reserved, not a frame)
pub const JPG: u8 = 0xC8;

/// Define Arithmetic Coding marker
pub const DAC: u8 = 0xCC;

/// Temporary marker, standalone
pub const TEM: u8 = 0x01;

const FORMAT_NAME: &str = "JPEG";

/// Whether `marker` starts a frame (SOF0..SOF15 minus DHT/JPG/DAC).
#[inline]
pub fn is_sof_marker(marker: u8) -> bool {
    (0xC0..=0xCF).contains(&marker) && marker != DHT && marker != JPG && marker != DAC
}

/// Markers that carry no length field.
#[inline]
fn is_standalone_marker(marker: u8) -> bool {
    marker == TEM || (0xD0..=0xD7).contains(&marker)
}

fn dims_error(reason: impl Into<String>) -> ProbeError {
    ProbeError::Dimensions {
        format: FORMAT_NAME,
        reason: reason.into(),
    }
}

/// Quick SOI check, used to confirm the file extension.
pub fn is_jpeg_header(bytes: &[u8]) -> bool {
    bytes.len() >= 3 && bytes[0..2] == SOI && bytes[2] == 0xFF
}

/// Read `(width, height)` from the first SOF segment.
pub async fn read_jpeg_dimensions<R: RangeReader>(reader: &R) -> Result<(u32, u32), ProbeError> {
    let size = reader.size();
    if size < 4 {
        return Err(dims_error("file too small"));
    }

    let soi = reader.read_exact_at(0, 2).await?;
    if soi[..] != SOI {
        return Err(dims_error("missing SOI marker"));
    }

    let mut pos: u64 = 2;
    loop {
        if pos + 2 > size {
            return Err(dims_error("no SOF marker before end of file"));
        }

        let marker_bytes = reader.read_exact_at(pos, 2).await?;
        if marker_bytes[0] != 0xFF {
            return Err(dims_error(format!(
                "expected marker at offset {}, found 0x{:02X}",
                pos, marker_bytes[0]
            )));
        }

        let marker = marker_bytes[1];

        // 0xFF fill bytes may precede any marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }

        if is_standalone_marker(marker) {
            pos += 2;
            continue;
        }

        if marker == SOS || marker == EOI {
            return Err(dims_error("reached image data without a SOF marker"));
        }

        if pos + 4 > size {
            return Err(dims_error("truncated segment header"));
        }
        let length = read_u16_be(&reader.read_exact_at(pos + 2, 2).await?) as u64;
        if length < 2 {
            return Err(dims_error(format!("invalid segment length {}", length)));
        }

        if is_sof_marker(marker) {
            // precision(1) height(2) width(2)
            if length < 7 || pos + 9 > size {
                return Err(dims_error("truncated SOF segment"));
            }
            let frame = reader.read_exact_at(pos + 4, 5).await?;
            let height = read_u16_be(&frame[1..3]) as u32;
            let width = read_u16_be(&frame[3..5]) as u32;

            // Height 0 defers to a DNL segment, which we do not chase
            if width == 0 || height == 0 {
                return Err(dims_error(format!("zero frame size {}x{}", width, height)));
            }

            return Ok((width, height));
        }

        pos += 2 + length;
    }
}
