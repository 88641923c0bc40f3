//! Error types for the predictor decoding pipeline.
//!
//! Every failure mode of inflating a stream and reversing its PNG predictor is
//! represented here. Recoverable conditions are returned next to partial data in
//! a [`DecodeOutcome`](crate::decoders::DecodeOutcome) rather than aborting.

/// Result type alias for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while decoding a predictor-filtered stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Every inflate strategy failed on the compressed payload
    #[error("FlateDecode decompression failed: {0}")]
    Decompression(String),

    /// Bits per component is zero or not a whole number of bytes
    #[error("Unsupported bits per component: {0} (must be a non-zero multiple of 8)")]
    UnsupportedBitDepth(usize),

    /// Columns or colors is zero
    #[error("Invalid decode parameters: {0}")]
    InvalidDecodeParams(String),

    /// Inflated data does not split into whole scanlines
    #[error(
        "Stream length {len} is not a multiple of row size {row_len} ({rows} complete rows)"
    )]
    StreamLengthMismatch {
        /// Length of the inflated data
        len: usize,
        /// Size of one scanline including its filter tag
        row_len: usize,
        /// Number of complete scanlines present
        rows: usize,
    },

    /// A scanline starts with a byte that is not a PNG filter type
    #[error("Invalid PNG filter tag {tag} in row {row}")]
    InvalidFilterTag {
        /// Zero-based scanline index
        row: usize,
        /// The offending tag byte
        tag: u8,
    },

    /// A valid PNG filter type that the legacy decoder does not implement
    #[error("Unsupported PNG filter {tag} in row {row}")]
    UnsupportedFilterTag {
        /// Zero-based scanline index
        row: usize,
        /// The filter tag byte
        tag: u8,
    },

    /// Unsupported stream filter
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// Decompression bomb protection tripped
    #[error("Decompression limit exceeded: {0}")]
    LimitExceeded(String),
}
