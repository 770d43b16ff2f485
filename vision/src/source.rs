//! Frame acquisition.

use std::path::{Path, PathBuf};

use image::RgbImage;
use log::debug;

use crate::error::VisionError;

/// Anything that can hand the locator a fresh RGB frame
pub trait FrameSource {
    /// Capture (or load) the next frame
    fn read_frame(&mut self) -> Result<RgbImage, VisionError>;
}

/// Reads an image file from disk on every call.
///
/// Re-reading lets an operator overwrite the file while tuning thresholds.
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for ImageFileSource {
    fn read_frame(&mut self) -> Result<RgbImage, VisionError> {
        if !self.path.exists() {
            return Err(VisionError::SourceUnavailable(format!(
                "no image at {}",
                self.path.display()
            )));
        }
        let frame = image::open(&self.path)?.to_rgb8();
        debug!(
            "Loaded {}x{} frame from {}",
            frame.width(),
            frame.height(),
            self.path.display()
        );
        Ok(frame)
    }
}

/// Serves the same in-memory frame every time
#[derive(Debug, Clone)]
pub struct StaticFrameSource {
    frame: RgbImage,
}

impl StaticFrameSource {
    pub fn new(frame: RgbImage) -> Self {
        Self { frame }
    }
}

impl FrameSource for StaticFrameSource {
    fn read_frame(&mut self) -> Result<RgbImage, VisionError> {
        Ok(self.frame.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_static_source_repeats_frame() {
        let mut frame = RgbImage::new(3, 2);
        frame.put_pixel(1, 1, Rgb([1, 2, 3]));
        let mut source = StaticFrameSource::new(frame.clone());
        assert_eq!(source.read_frame().unwrap(), frame);
        assert_eq!(source.read_frame().unwrap(), frame);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let mut source = ImageFileSource::new("/nonexistent/frame.png");
        assert!(matches!(
            source.read_frame(),
            Err(VisionError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn test_file_source_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut frame = RgbImage::new(8, 4);
        frame.put_pixel(7, 3, Rgb([20, 140, 60]));
        frame.save(&path).unwrap();

        let mut source = ImageFileSource::new(&path);
        let loaded = source.read_frame().unwrap();
        assert_eq!(loaded.dimensions(), (8, 4));
        assert_eq!(*loaded.get_pixel(7, 3), Rgb([20, 140, 60]));
    }
}
