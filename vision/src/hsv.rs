//! Color conversion and HSV band thresholding.
//!
//! Uses the 8-bit camera convention: hue is stored as degrees / 2 so it fits
//! in `[0, 180)`, saturation and value span `[0, 255]`.

use image::{Rgb, RgbImage};
use ndarray::{Array2, Zip};
use shared::ImageSize;

use crate::config::HsvBand;

/// One pixel in 8-bit HSV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    /// Hue, degrees / 2 in `[0, 180)`
    pub h: u8,
    /// Saturation in `[0, 255]`
    pub s: u8,
    /// Value (brightness) in `[0, 255]`
    pub v: u8,
}

/// Convert an RGB pixel to 8-bit HSV
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> Hsv {
    let [r, g, b] = pixel.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = (max - min) as f32;

    let s = if max == 0 {
        0.0
    } else {
        255.0 * diff / max as f32
    };

    let hue_degrees = if diff == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g as f32 - b as f32) / diff
    } else if max == g {
        120.0 + 60.0 * (b as f32 - r as f32) / diff
    } else {
        240.0 + 60.0 * (r as f32 - g as f32) / diff
    };
    let hue_degrees = if hue_degrees < 0.0 {
        hue_degrees + 360.0
    } else {
        hue_degrees
    };

    // 359.x degrees rounds to 180, which wraps back to red
    let h = (hue_degrees / 2.0).round() as u16 % 180;

    Hsv {
        h: h as u8,
        s: s.round() as u8,
        v: max,
    }
}

/// Binary mask of the pixels whose HSV color lies inside `band`.
///
/// The three per-channel masks are combined with a logical AND. The mask is
/// indexed `[row, col]` (i.e. `[y, x]`).
pub fn hsv_threshold(frame: &RgbImage, band: &HsvBand) -> Array2<bool> {
    let (width, height) = frame.dimensions();
    let mut mask = ImageSize::from_width_height(width as usize, height as usize).empty_mask();

    Zip::indexed(&mut mask).par_for_each(|(y, x), m| {
        let hsv = rgb_to_hsv(*frame.get_pixel(x as u32, y as u32));
        *m = band.contains(hsv);
    });

    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelRange;

    #[test]
    fn test_primary_colors() {
        assert_eq!(rgb_to_hsv(Rgb([255, 0, 0])), Hsv { h: 0, s: 255, v: 255 });
        assert_eq!(rgb_to_hsv(Rgb([0, 255, 0])), Hsv { h: 60, s: 255, v: 255 });
        assert_eq!(rgb_to_hsv(Rgb([0, 0, 255])), Hsv { h: 120, s: 255, v: 255 });
    }

    #[test]
    fn test_grays_have_no_saturation() {
        assert_eq!(rgb_to_hsv(Rgb([0, 0, 0])), Hsv { h: 0, s: 0, v: 0 });
        assert_eq!(rgb_to_hsv(Rgb([128, 128, 128])), Hsv { h: 0, s: 0, v: 128 });
    }

    #[test]
    fn test_target_green() {
        // Dim LED green reflected off the tape
        let hsv = rgb_to_hsv(Rgb([20, 140, 60]));
        assert_eq!(hsv.v, 140);
        assert_eq!(hsv.s, 219);
        assert_eq!(hsv.h, 70);
        assert!(HsvBand::default().contains(hsv));
    }

    #[test]
    fn test_hue_wraps_near_red() {
        // Hue just below 360 degrees must not overflow the 180 range
        let hsv = rgb_to_hsv(Rgb([255, 0, 1]));
        assert!(hsv.h < 180);
    }

    #[test]
    fn test_threshold_mask_layout() {
        let mut frame = RgbImage::new(4, 2);
        frame.put_pixel(3, 1, Rgb([20, 140, 60]));
        frame.put_pixel(0, 0, Rgb([255, 255, 255]));

        let mask = hsv_threshold(&frame, &HsvBand::default());
        assert_eq!(mask.dim(), (2, 4));
        assert!(mask[[1, 3]]);
        assert_eq!(mask.iter().filter(|&&m| m).count(), 1);
    }

    #[test]
    fn test_threshold_with_custom_band() {
        let band = HsvBand {
            hue: ChannelRange::new(0, 179),
            saturation: ChannelRange::new(0, 255),
            value: ChannelRange::new(200, 255),
        };
        let mut frame = RgbImage::new(2, 2);
        frame.put_pixel(1, 0, Rgb([255, 255, 255]));
        let mask = hsv_threshold(&frame, &band);
        assert!(mask[[0, 1]]);
        assert!(!mask[[0, 0]]);
    }
}
