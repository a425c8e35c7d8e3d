//! Byte-range access to source files.
//!
//! Header probing only ever needs a few hundred bytes scattered across the
//! start of a file, so the probe reads through [`RangeReader`] instead of
//! loading the image. [`BlockCache`] turns those small reads into a handful of
//! block-sized file reads.

mod block_cache;
mod file_reader;
mod range_reader;

pub use block_cache::{BlockCache, DEFAULT_BLOCK_SIZE};
pub use file_reader::FileRangeReader;
pub use range_reader::{
    read_u16_be, read_u16_le, read_u32_be, read_u32_le, read_u64_be, read_u64_le,
    MemoryRangeReader, RangeReader,
};
