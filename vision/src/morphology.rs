//! Binary morphology with square structuring elements.
//!
//! A `size` x `size` square is the L-infinity ball of radius `size / 2`, so
//! an even size behaves like the next odd one. Pixels outside the frame
//! never influence the result.

use imageproc::distance_transform::Norm;
use imageproc::morphology;
use ndarray::{Array2, ArrayView2};

use crate::mask::{gray_to_mask, mask_to_gray};

fn radius(size: usize) -> u8 {
    u8::try_from(size / 2).unwrap_or(u8::MAX)
}

/// Erode `mask` with a `size` x `size` square.
///
/// A pixel survives only when every in-frame pixel of the window centered on
/// it is set, so regions narrower than `size` disappear.
pub fn erode(mask: ArrayView2<bool>, size: usize) -> Array2<bool> {
    gray_to_mask(&morphology::erode(&mask_to_gray(mask), Norm::LInf, radius(size)))
}

/// Dilate `mask` with a `size` x `size` square.
///
/// A pixel is set when any pixel of the window centered on it is set, so
/// gaps narrower than `size` inside a region are closed.
pub fn dilate(mask: ArrayView2<bool>, size: usize) -> Array2<bool> {
    gray_to_mask(&morphology::dilate(&mask_to_gray(mask), Norm::LInf, radius(size)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn count(mask: &Array2<bool>) -> usize {
        mask.iter().filter(|&&m| m).count()
    }

    #[test]
    fn test_erode_removes_isolated_pixels() {
        let mut mask = Array2::from_elem((10, 10), false);
        mask[[2, 2]] = true;
        mask[[7, 5]] = true;
        mask[[7, 6]] = true;

        let eroded = erode(mask.view(), 3);
        assert_eq!(count(&eroded), 0);
    }

    #[test]
    fn test_erode_shrinks_block_by_one() {
        let mut mask = Array2::from_elem((10, 10), false);
        for y in 2..7 {
            for x in 3..8 {
                mask[[y, x]] = true;
            }
        }

        let eroded = erode(mask.view(), 3);
        assert_eq!(count(&eroded), 9);
        assert!(eroded[[3, 4]] && eroded[[5, 6]]);
        assert!(!eroded[[2, 3]]);
    }

    #[test]
    fn test_erode_ignores_out_of_frame() {
        let mask = Array2::from_elem((4, 4), true);
        let eroded = erode(mask.view(), 3);
        assert_eq!(count(&eroded), 16);
    }

    #[test]
    fn test_dilate_grows_pixel_to_window() {
        let mut mask = Array2::from_elem((20, 20), false);
        mask[[10, 10]] = true;

        let dilated = dilate(mask.view(), 9);
        assert_eq!(count(&dilated), 81);
        assert!(dilated[[6, 6]] && dilated[[14, 14]]);
        assert!(!dilated[[5, 10]]);
    }

    #[test]
    fn test_dilate_closes_gap() {
        let mask = arr2(&[[true, false, false, true, false, false, false]]);
        let dilated = dilate(mask.view(), 3);
        assert_eq!(
            dilated.row(0).to_vec(),
            vec![true, true, true, true, true, false, false]
        );
    }

    #[test]
    fn test_size_one_is_identity() {
        let mask = arr2(&[[true, false], [false, true]]);
        assert_eq!(erode(mask.view(), 1), mask);
        assert_eq!(dilate(mask.view(), 1), mask);
    }
}
