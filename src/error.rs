use thiserror::Error;

/// I/O errors that can occur when talking to local or object storage
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Error from the storage backend (filesystem, S3 or S3-compatible storage)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Object, directory or array not found
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Errors produced while parsing or validating a region selection string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// Selection does not decompose into exactly five axis terms
    #[error("Invalid number of dimensions in region selection: expected 5, got {0}")]
    TermCount(usize),

    /// A term is not a non-negative integer
    #[error("Invalid number in region selection: {0:?}")]
    InvalidNumber(String),

    /// A `start:end` term is malformed or has `end < start`
    #[error("Invalid range in region selection: {0:?}")]
    InvalidRange(String),

    /// Tile (y, x) extent exceeds the configured maximum edge length
    #[error("Tile size {height}x{width} exceeds max size of {max}")]
    TileTooLarge { width: u64, height: u64, max: u64 },

    /// Requested region falls outside the array
    #[error("Region out of bounds on axis {axis}: {start}+{size} > {extent}")]
    OutOfBounds {
        axis: usize,
        start: u64,
        size: u64,
        extent: u64,
    },

    /// Array is not five dimensional
    #[error("Number of dimensions must be 5. Actual was: {0}")]
    Dimensionality(usize),
}

/// Errors returned by the pixel access layer
#[derive(Debug, Clone, Error)]
pub enum PixelsError {
    /// Process-level configuration is missing or inconsistent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller supplied an argument that can never succeed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Region selection could not be parsed or validated
    #[error("Invalid region: {0}")]
    Region(#[from] RegionError),

    /// Numeric encoding is unknown or not supported on this code path
    #[error("Unsupported pixel type: {0}")]
    UnsupportedType(String),

    /// Min/max requested over an empty buffer
    #[error("Cannot get min/max of empty buffer")]
    EmptyBuffer,

    /// Path, resolution level or array does not exist
    #[error("No data at {0}")]
    NotFound(String),

    /// Operation is part of the host buffer interface but not provided here
    #[error("{operation} is not supported for this backend")]
    Unsupported { operation: &'static str },

    /// Storage failure, left to the caller's retry policy
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

impl PixelsError {
    /// Whether this error means "no data" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PixelsError::NotFound(_) | PixelsError::Io(IoError::NotFound(_))
        )
    }

    /// Whether this error is a rejected request (never worth retrying).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            PixelsError::InvalidArgument(_)
                | PixelsError::Region(_)
                | PixelsError::UnsupportedType(_)
                | PixelsError::EmptyBuffer
        )
    }
}
