//! Image dimensions and size utilities

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Image dimensions structure
///
/// Represents the width and height of a camera frame.
/// Provides convenience methods for creating masks and center calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
}

impl ImageSize {
    /// Create a new ImageSize
    pub fn from_width_height(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Create an all-false mask with this size
    ///
    /// Returns an ndarray Array2 with shape (height, width).
    /// Note the row-major ordering convention: rows (height) come first.
    pub fn empty_mask(&self) -> Array2<bool> {
        Array2::from_elem((self.height, self.width), false)
    }

    /// Get total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Frame center in pixel coordinates as (x, y)
    ///
    /// Uses `size / 2.0`, so a 640 wide frame has its center at x = 320.0.
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Convert to tuple (width, height)
    pub fn to_tuple(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Create from tuple (width, height)
    pub fn from_tuple(dimensions: (usize, usize)) -> Self {
        Self {
            width: dimensions.0,
            height: dimensions.1,
        }
    }
}

impl From<(usize, usize)> for ImageSize {
    fn from(dimensions: (usize, usize)) -> Self {
        Self::from_tuple(dimensions)
    }
}

impl From<ImageSize> for (usize, usize) {
    fn from(size: ImageSize) -> Self {
        size.to_tuple()
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_shape_is_row_major() {
        let size = ImageSize::from_width_height(64, 48);
        let mask = size.empty_mask();
        assert_eq!(mask.dim(), (48, 64));
        assert!(mask.iter().all(|&m| !m));
        assert_eq!(size.pixel_count(), 3072);
    }

    #[test]
    fn test_center_and_display() {
        let size: ImageSize = (641, 480).into();
        assert_eq!(size.center(), (320.5, 240.0));
        assert_eq!(size.to_string(), "641x480");
    }
}
