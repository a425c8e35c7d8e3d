//! PNG dimension probing.
//!
//! The PNG specification requires IHDR to be the first chunk, so the size is
//! always at a fixed offset:
//!
//! ```text
//! 0..8    signature 89 50 4E 47 0D 0A 1A 0A
//! 8..12   chunk length (13)
//! 12..16  "IHDR"
//! 16..20  width  (u32 BE)
//! 20..24  height (u32 BE)
//! ```

use crate::error::ProbeError;
use crate::io::{read_u32_be, RangeReader};

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

const IHDR: &[u8; 4] = b"IHDR";

/// Bytes needed to reach the end of the IHDR height field
const IHDR_PREFIX_LEN: usize = 24;

/// Largest dimension the format allows (2^31 - 1)
const MAX_DIMENSION: u32 = 0x7FFF_FFFF;

const FORMAT_NAME: &str = "PNG";

fn dims_error(reason: impl Into<String>) -> ProbeError {
    ProbeError::Dimensions {
        format: FORMAT_NAME,
        reason: reason.into(),
    }
}

/// Quick signature check, used to confirm the file extension.
pub fn is_png_header(bytes: &[u8]) -> bool {
    bytes.len() >= PNG_SIGNATURE.len() && bytes[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

/// Read `(width, height)` from the IHDR chunk.
pub async fn read_png_dimensions<R: RangeReader>(reader: &R) -> Result<(u32, u32), ProbeError> {
    if reader.size() < IHDR_PREFIX_LEN as u64 {
        return Err(dims_error(format!(
            "file too small: {} bytes",
            reader.size()
        )));
    }

    let bytes = reader.read_exact_at(0, IHDR_PREFIX_LEN).await?;
    if !is_png_header(&bytes) {
        return Err(dims_error("bad signature"));
    }
    if &bytes[12..16] != IHDR {
        return Err(dims_error("first chunk is not IHDR"));
    }

    let width = read_u32_be(&bytes[16..20]);
    let height = read_u32_be(&bytes[20..24]);

    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(dims_error(format!("invalid size {}x{}", width, height)));
    }

    Ok((width, height))
}
