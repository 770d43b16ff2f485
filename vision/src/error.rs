use thiserror::Error;

/// Errors raised while acquiring or saving frames.
///
/// Locating a target never fails: an empty result is `None`, not an error.
#[derive(Error, Debug)]
pub enum VisionError {
    /// Failed to decode or encode an image file
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The frame source could not deliver a frame
    #[error("Frame source unavailable: {0}")]
    SourceUnavailable(String),
}
