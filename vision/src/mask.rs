//! Conversions between `ndarray` masks and `imageproc` gray images.
//!
//! Masks are `Array2<bool>` indexed `[row, col]`. In gray form a set pixel
//! is 255 and a clear one 0; any non-zero pixel reads back as set.

use image::{GrayImage, Luma};
use ndarray::{Array2, ArrayView2};

const SET: u8 = 255;

pub fn mask_to_gray(mask: ArrayView2<bool>) -> GrayImage {
    let (rows, cols) = mask.dim();
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        Luma([if mask[[y as usize, x as usize]] { SET } else { 0 }])
    })
}

pub fn gray_to_mask(image: &GrayImage) -> Array2<bool> {
    let (width, height) = image.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        image.get_pixel(x as u32, y as u32)[0] > 0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_layout_matches_image_coordinates() {
        let mask = arr2(&[[true, false, false], [false, false, true]]);
        let gray = mask_to_gray(mask.view());

        assert_eq!(gray.dimensions(), (3, 2));
        assert_eq!(gray.get_pixel(0, 0)[0], 255);
        assert_eq!(gray.get_pixel(2, 1)[0], 255);
        assert_eq!(gray.get_pixel(1, 0)[0], 0);
        assert_eq!(gray_to_mask(&gray), mask);
    }
}
