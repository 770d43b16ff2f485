//! Tunable thresholds for the target locator.
//!
//! Defaults are tuned for the green LED ring reflecting off the goal's
//! retro-reflective tape, as seen by a 640x480 camera.

use serde::{Deserialize, Serialize};

use crate::hsv::Hsv;

/// Inclusive `[min, max]` band on one 8-bit channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub min: u8,
    pub max: u8,
}

impl ChannelRange {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u8) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Color band of the target in 8-bit HSV (hue in `[0, 180)`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvBand {
    pub hue: ChannelRange,
    pub saturation: ChannelRange,
    pub value: ChannelRange,
}

impl HsvBand {
    /// True when all three channels fall inside their bands
    pub fn contains(&self, hsv: Hsv) -> bool {
        self.hue.contains(hsv.h) && self.saturation.contains(hsv.s) && self.value.contains(hsv.v)
    }
}

impl Default for HsvBand {
    fn default() -> Self {
        Self {
            hue: ChannelRange::new(58, 123),
            saturation: ChannelRange::new(104, 255),
            value: ChannelRange::new(20, 155),
        }
    }
}

/// Configuration for [`TargetLocator`](crate::TargetLocator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Color band of the target
    pub band: HsvBand,
    /// Side of the square erosion element (pixels)
    pub erode_kernel: usize,
    /// Side of the square dilation element (pixels)
    pub dilate_kernel: usize,
    /// Smallest accepted contour area (pixels²), rejects sensor noise
    pub min_area: f64,
    /// Largest accepted contour area (pixels²), rejects oversized false positives
    pub max_area: f64,
    /// Lower bound on the bounding rectangle's long/short side ratio
    pub min_ratio: f64,
    /// Upper bound on the bounding rectangle's long/short side ratio
    pub max_ratio: f64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            band: HsvBand::default(),
            erode_kernel: 3,
            dilate_kernel: 9,
            min_area: 200.0,
            max_area: 30720.0,
            min_ratio: 1.1,
            max_ratio: 3.0,
        }
    }
}
