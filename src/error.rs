//! Error types for the smart mirror library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O or socket operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image loading or encoding failed
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Head pose payload could not be decoded
    #[error("Payload decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// Invalid input parameters provided (bad bin index, unknown axis, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Message framing violated
    #[error("Wire error: {0}")]
    Wire(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Presentation worker failed
    #[error("Presenter error: {0}")]
    Presenter(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
