//! Outer boundaries of connected regions.
//!
//! Foreground is 8-connected. A region sitting inside the hole of another
//! region is not reported, matching an external-only contour search.

use imageproc::contours::{find_contours, BorderType};
use ndarray::ArrayView2;

use crate::mask::mask_to_gray;

/// A point in pixel coordinates (x right, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Outer boundary of one connected region
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Boundary pixel centers in tracing order, starting at the region's
    /// first pixel in raster order
    pub points: Vec<Point>,
}

impl Contour {
    /// Enclosed area of the boundary polygon
    pub fn area(&self) -> f64 {
        contour_area(&self.points)
    }
}

/// Outer boundaries of all top-level regions of `mask`, in raster order of
/// each region's first pixel.
pub fn find_outer_contours(mask: ArrayView2<bool>) -> Vec<Contour> {
    find_contours::<i32>(&mask_to_gray(mask))
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .map(|contour| Contour {
            points: contour
                .points
                .iter()
                .map(|p| Point::new(p.x as f64, p.y as f64))
                .collect(),
        })
        .collect()
}

/// Area enclosed by a closed polygon (shoelace formula)
///
/// Returns 0 for fewer than three points.
pub fn contour_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice_area: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice_area.abs() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn block_mask(rows: usize, cols: usize, blocks: &[(usize, usize, usize, usize)]) -> Array2<bool> {
        let mut mask = Array2::from_elem((rows, cols), false);
        for &(x0, y0, w, h) in blocks {
            for y in y0..y0 + h {
                for x in x0..x0 + w {
                    mask[[y, x]] = true;
                }
            }
        }
        mask
    }

    #[test]
    fn test_square_boundary() {
        let mask = block_mask(6, 6, &[(1, 1, 3, 3)]);
        let contours = find_outer_contours(mask.view());

        assert_eq!(contours.len(), 1);
        let points = &contours[0].points;
        assert_eq!(points.len(), 8);
        assert_eq!(points[0], Point::new(1.0, 1.0));
        for corner in [(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)] {
            assert!(points.contains(&Point::new(corner.0, corner.1)));
        }
        // Interior pixel is not on the boundary
        assert!(!points.contains(&Point::new(2.0, 2.0)));
        // Boundary polygon through pixel centers spans (w-1) x (h-1)
        assert_eq!(contours[0].area(), 4.0);
    }

    #[test]
    fn test_rectangle_area() {
        let mask = block_mask(40, 60, &[(5, 7, 30, 12)]);
        let contours = find_outer_contours(mask.view());
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].area(), 29.0 * 11.0);
    }

    #[test]
    fn test_diagonal_pixels_are_one_region() {
        let mask = block_mask(6, 6, &[(1, 1, 1, 1), (2, 2, 1, 1), (3, 3, 1, 1)]);
        assert_eq!(find_outer_contours(mask.view()).len(), 1);
    }

    #[test]
    fn test_single_pixel_and_line() {
        let mask = block_mask(10, 10, &[(1, 1, 1, 1), (4, 5, 5, 1)]);
        let contours = find_outer_contours(mask.view());
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].points, vec![Point::new(1.0, 1.0)]);
        assert_eq!(contours[0].area(), 0.0);
        assert_eq!(contours[1].area(), 0.0);
    }

    #[test]
    fn test_region_touching_edge() {
        let mask = block_mask(8, 8, &[(0, 0, 4, 3)]);
        let contours = find_outer_contours(mask.view());
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].area(), 6.0);
    }

    #[test]
    fn test_nested_region_is_not_outer() {
        // 11x11 ring with a 1 pixel blob in the middle of its hole
        let mut mask = block_mask(15, 15, &[(2, 2, 11, 11)]);
        for y in 4..11 {
            for x in 4..11 {
                mask[[y, x]] = false;
            }
        }
        mask[[7, 7]] = true;

        let contours = find_outer_contours(mask.view());
        assert_eq!(contours.len(), 1);
        // The outer boundary ignores the hole
        assert_eq!(contours[0].area(), 100.0);
    }

    #[test]
    fn test_contours_in_raster_order() {
        let mask = block_mask(30, 30, &[(20, 2, 4, 4), (2, 10, 4, 4)]);
        let contours = find_outer_contours(mask.view());
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].points[0], Point::new(20.0, 2.0));
        assert_eq!(contours[1].points[0], Point::new(2.0, 10.0));
    }

    #[test]
    fn test_empty_mask() {
        let mask = Array2::from_elem((5, 5), false);
        assert!(find_outer_contours(mask.view()).is_empty());
    }

    #[test]
    fn test_contour_area_triangle() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 3.0),
        ];
        assert_eq!(contour_area(&points), 6.0);
    }
}
