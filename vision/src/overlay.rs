//! Operator display markings drawn on top of a processed frame.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

use crate::min_rect::RotatedRect;

/// Color of the target center marker
pub const MARKER_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
/// Color of the target outline
pub const OUTLINE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
/// Radius of the target center marker (pixels)
pub const MARKER_RADIUS: i32 = 5;

/// Corners of a rotated rectangle, in order around its perimeter
pub fn rect_corners(rect: &RotatedRect) -> [(f32, f32); 4] {
    let (sin, cos) = rect.angle.to_radians().sin_cos();
    let (hw, hh) = (rect.width / 2.0, rect.height / 2.0);
    [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)].map(|(u, v)| {
        (
            (rect.center.x + u * cos - v * sin) as f32,
            (rect.center.y + u * sin + v * cos) as f32,
        )
    })
}

/// Outline the target rectangle and circle its center.
pub fn mark_target(frame: &mut RgbImage, rect: &RotatedRect) {
    let corners = rect_corners(rect);
    for i in 0..corners.len() {
        draw_line_segment_mut(frame, corners[i], corners[(i + 1) % corners.len()], OUTLINE_COLOR);
    }

    let center = (rect.center.x.round() as i32, rect.center.y.round() as i32);
    draw_hollow_circle_mut(frame, center, MARKER_RADIUS, MARKER_COLOR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contours::Point;

    #[test]
    fn test_marker_drawn_around_center() {
        let mut frame = RgbImage::new(40, 40);
        let rect = RotatedRect {
            center: Point::new(20.0, 20.0),
            width: 20.0,
            height: 8.0,
            angle: 0.0,
        };
        mark_target(&mut frame, &rect);

        assert_eq!(*frame.get_pixel(25, 20), MARKER_COLOR);
        assert_eq!(*frame.get_pixel(20, 15), MARKER_COLOR);
        assert_eq!(*frame.get_pixel(20, 20), Rgb([0, 0, 0]));
        assert_eq!(*frame.get_pixel(10, 16), OUTLINE_COLOR);
    }

    #[test]
    fn test_marker_clipped_at_frame_edge() {
        let mut frame = RgbImage::new(10, 10);
        let rect = RotatedRect {
            center: Point::new(0.0, 0.0),
            width: 4.0,
            height: 2.0,
            angle: -30.0,
        };
        mark_target(&mut frame, &rect);
        assert_eq!(*frame.get_pixel(5, 0), MARKER_COLOR);
    }
}
