//! Error types for the texfmt core.

use thiserror::Error;

/// Errors produced when building color or packed buffers.
#[derive(Debug, Error)]
pub enum ReproError {
    /// Width or height was zero, or `width * height` overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A pixel slice did not hold exactly `width * height` entries.
    #[error("buffer size mismatch: expected {expected} elements, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },

    /// A packed format name could not be parsed.
    #[error("unknown pixel format: {0}")]
    UnknownFormat(String),
}
