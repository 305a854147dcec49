//! Error types for the text-watermark crate.

/// Errors that can occur while loading, watermarking or encoding an image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input is not a PNG or JPEG image.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The input looked like a supported format but could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    /// A watermark parameter is outside its accepted range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    Validation {
        /// Name of the offending parameter.
        field: &'static str,
        /// The rejected value.
        value: i64,
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },

    /// The watermark position name is not recognized.
    #[error("unknown watermark position: {0:?}")]
    InvalidPosition(String),

    /// A watermark was requested before any image was uploaded.
    #[error("no image has been uploaded")]
    NoImage,

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred while encoding the output image.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
