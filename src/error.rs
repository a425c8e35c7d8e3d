use std::path::PathBuf;

use thiserror::Error;

/// I/O errors that can occur when reading byte ranges from a source file
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// File could not be opened or read
    #[error("Read error on {path}: {message}")]
    Read { path: String, message: String },

    /// File not found
    #[error("File not found: {0}")]
    NotFound(String),
}

/// Errors that can occur when parsing TIFF headers
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42 (TIFF) or 43 (BigTIFF), got {0}")]
    InvalidVersion(u16),

    /// Invalid BigTIFF offset byte size (must be 8)
    #[error("Invalid BigTIFF offset byte size: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file or to invalid location)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// Required tag is missing from IFD
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// Tag has unexpected type or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },
}

/// Errors raised while probing source image metadata
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    /// File extension is not one of jpg/jpeg/png/tif/tiff
    #[error("Unknown source image type: {path}; JPG, TIFF, or PNG only")]
    UnknownType { path: String },

    /// Header bytes could not be parsed for the detected format
    #[error("Could not parse source image dims ({format}): {reason}")]
    Dimensions { format: &'static str, reason: String },

    /// I/O error while reading the header
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// TIFF structure error
    #[error("TIFF error: {0}")]
    Tiff(#[from] TiffError),
}

/// Errors raised while cutting and encoding tiles
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// Source pixels could not be decoded
    #[error("Failed to decode source image: {message}")]
    DecodeError { message: String },

    /// Tile could not be encoded as PNG
    #[error("Failed to encode tile: {message}")]
    EncodeError { message: String },

    /// Grid geometry cannot produce the expected number of tiles
    #[error("Grid of {tile_count}x{tile_count} tiles of {raw_width}px leaves empty cells in a {source_width}px source")]
    EmptyCells {
        tile_count: u32,
        raw_width: u32,
        source_width: u32,
    },

    /// The crop step produced a different number of tiles than expected
    #[error("Expected {expected} tiles, produced {produced}")]
    CountMismatch { expected: u64, produced: u64 },

    /// Zoom so deep that most cells would lie outside the source
    #[error("Zoom grid of {tile_count}x{tile_count} tiles is more than twice the {covered_cells} cells the source covers")]
    Overzoomed { tile_count: u32, covered_cells: u32 },

    /// Zoom or source size cannot form a grid
    #[error("Cannot build a zoom {zoom} grid over a {source_width}px source")]
    InvalidGrid { zoom: u32, source_width: u32 },

    /// Blocking worker did not complete
    #[error("Tiling worker failed: {0}")]
    Worker(String),
}

/// Top-level error for a tiling run.
///
/// Every variant maps to a dedicated process exit code so batch scripts can
/// tell failure categories apart.
#[derive(Debug, Error)]
pub enum TilerError {
    /// Zoom argument is neither `N` nor `MIN-MAX`
    #[error("Couldn't parse zoom levels '{input}'; should be int or 'min-max': {reason}")]
    ZoomParse { input: String, reason: String },

    /// Invalid option values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unsupported source extension
    #[error("{0}")]
    UnknownSourceType(ProbeError),

    /// Metadata could not be read
    #[error("{0}")]
    SourceDims(ProbeError),

    /// Source is not square
    #[error("Source image should be square, got {width}x{height}")]
    NotSquare { width: u32, height: u32 },

    /// Source pixels could not be decoded
    #[error("Could not decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: TileError,
    },

    /// Crop/resize failed or produced the wrong tile count
    #[error("Tiling failed at zoom {zoom}: {source}")]
    TilingFailed {
        zoom: u32,
        #[source]
        source: TileError,
    },

    /// Filesystem failure
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TilerError {
    /// Process exit code for this error category.
    pub const fn exit_code(&self) -> u8 {
        match self {
            TilerError::ZoomParse { .. } | TilerError::Config(_) => 2,
            TilerError::UnknownSourceType(_) => 3,
            TilerError::SourceDims(_) => 4,
            TilerError::NotSquare { .. } => 5,
            TilerError::Decode { .. } | TilerError::TilingFailed { .. } => 6,
            TilerError::Io { .. } => 7,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TilerError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ProbeError> for TilerError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::UnknownType { .. } => TilerError::UnknownSourceType(err),
            other => TilerError::SourceDims(other),
        }
    }
}
