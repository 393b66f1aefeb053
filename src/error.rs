use thiserror::Error;

/// Errors produced by the sketch pipeline.
#[derive(Debug, Error)]
pub enum SketchError {
    /// The input bytes could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    DecodeError(String),

    /// The input bytes are not in a recognized image format.
    #[error("unsupported image format")]
    UnsupportedFormat,

    /// The decoded image has a zero width or height.
    #[error("image dimensions are zero")]
    ZeroDimensions,

    /// `max_dimension` was configured as zero.
    #[error("max dimension must be > 0")]
    InvalidMaxDimension,

    /// The finished canvas could not be encoded as PNG.
    #[error("failed to encode sketch: {0}")]
    EncodeError(String),

    /// A detector model file could not be read or parsed.
    #[error("failed to load detector model: {0}")]
    ModelLoad(String),
}
