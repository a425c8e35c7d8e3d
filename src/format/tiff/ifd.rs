//! IFD0 scanning for image dimensions.
//!
//! An IFD is an entry count followed by fixed-size entries:
//!
//! ```text
//! Classic: tag(2) type(2) count(4) value/offset(4)
//! BigTIFF: tag(2) type(2) count(8) value/offset(8)
//! ```
//!
//! ImageWidth and ImageLength are single SHORT/LONG values and always fit in
//! the inline value field, so no offsets need to be followed.

use tracing::debug;

use super::parser::{TiffHeader, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE};
use super::tags::{FieldType, TiffTag};
use crate::error::TiffError;
use crate::io::RangeReader;

/// Upper bound on IFD0 entries; real files carry a few dozen.
const MAX_IFD_ENTRIES: u64 = 4096;

/// A single IFD entry with its inline value bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdEntry {
    pub tag: u16,
    pub field_type: Option<FieldType>,
    pub count: u64,
    pub value_bytes: Vec<u8>,
}

impl IfdEntry {
    /// Parse one entry from exactly `header.ifd_entry_size()` bytes.
    pub fn parse(bytes: &[u8], header: &TiffHeader) -> Self {
        let order = header.byte_order;
        let tag = order.read_u16(&bytes[0..2]);
        let field_type = FieldType::from_u16(order.read_u16(&bytes[2..4]));

        let (count, value_start) = if header.is_bigtiff {
            (order.read_u64(&bytes[4..12]), 12)
        } else {
            (order.read_u32(&bytes[4..8]) as u64, 8)
        };

        let value_end = value_start + header.value_offset_size();
        IfdEntry {
            tag,
            field_type,
            count,
            value_bytes: bytes[value_start..value_end].to_vec(),
        }
    }

    /// Read a single inline unsigned value (SHORT, LONG, or LONG8).
    pub fn inline_u64(&self, header: &TiffHeader, tag: TiffTag) -> Result<u64, TiffError> {
        let field_type = match self.field_type {
            Some(t) if t.is_unsigned_integer() => t,
            _ => {
                return Err(TiffError::InvalidTagValue {
                    tag: tag.name(),
                    message: "expected SHORT, LONG or LONG8".to_string(),
                })
            }
        };

        if self.count != 1 {
            return Err(TiffError::InvalidTagValue {
                tag: tag.name(),
                message: format!("expected 1 value, got {}", self.count),
            });
        }

        if field_type.size_in_bytes() > self.value_bytes.len() {
            return Err(TiffError::InvalidTagValue {
                tag: tag.name(),
                message: "LONG8 in a classic TIFF entry".to_string(),
            });
        }

        let order = header.byte_order;
        Ok(match field_type {
            FieldType::Short => order.read_u16(&self.value_bytes) as u64,
            FieldType::Long => order.read_u32(&self.value_bytes) as u64,
            _ => order.read_u64(&self.value_bytes),
        })
    }
}

/// Read `(width, height)` from the first IFD of a TIFF or BigTIFF file.
pub async fn read_tiff_dimensions<R: RangeReader>(reader: &R) -> Result<(u32, u32), TiffError> {
    let size = reader.size();
    if size < TIFF_HEADER_SIZE as u64 {
        return Err(TiffError::FileTooSmall {
            required: TIFF_HEADER_SIZE as u64,
            actual: size,
        });
    }

    let header_len = (BIGTIFF_HEADER_SIZE as u64).min(size) as usize;
    let header_bytes = reader.read_exact_at(0, header_len).await?;
    let header = TiffHeader::parse(&header_bytes, size)?;

    let count_size = header.ifd_count_size();
    if header.first_ifd_offset + count_size as u64 > size {
        return Err(TiffError::InvalidIfdOffset(header.first_ifd_offset));
    }
    let count_bytes = reader
        .read_exact_at(header.first_ifd_offset, count_size)
        .await?;
    let entry_count = if header.is_bigtiff {
        header.byte_order.read_u64(&count_bytes)
    } else {
        header.byte_order.read_u16(&count_bytes) as u64
    };

    if entry_count == 0 || entry_count > MAX_IFD_ENTRIES {
        return Err(TiffError::InvalidTagValue {
            tag: "IFD0",
            message: format!("implausible entry count {}", entry_count),
        });
    }

    let entry_size = header.ifd_entry_size();
    let entries_offset = header.first_ifd_offset + count_size as u64;
    let entries_len = entry_count as usize * entry_size;
    if entries_offset + entries_len as u64 > size {
        return Err(TiffError::InvalidIfdOffset(header.first_ifd_offset));
    }
    let entries = reader.read_exact_at(entries_offset, entries_len).await?;

    debug!(
        "IFD0 of {} at {} has {} entries (bigtiff: {})",
        reader.identifier(),
        header.first_ifd_offset,
        entry_count,
        header.is_bigtiff
    );

    let mut width = None;
    let mut height = None;
    for chunk in entries.chunks_exact(entry_size) {
        let entry = IfdEntry::parse(chunk, &header);
        match TiffTag::from_u16(entry.tag) {
            Some(tag @ TiffTag::ImageWidth) => width = Some(entry.inline_u64(&header, tag)?),
            Some(tag @ TiffTag::ImageLength) => height = Some(entry.inline_u64(&header, tag)?),
            None => {}
        }
    }

    let width = width.ok_or(TiffError::MissingTag("ImageWidth"))?;
    let height = height.ok_or(TiffError::MissingTag("ImageLength"))?;

    let to_u32 = |value: u64, tag: &'static str| {
        u32::try_from(value).map_err(|_| TiffError::InvalidTagValue {
            tag,
            message: format!("{} does not fit in 32 bits", value),
        })
    };

    Ok((to_u32(width, "ImageWidth")?, to_u32(height, "ImageLength")?))
}
