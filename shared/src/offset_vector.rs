//! Offset vector produced by the target locator.
//!
//! Carried from the vision co-processor to the control loop over telemetry,
//! and consumed by the angle/distance conversions in [`crate::geometry`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel displacement and rotation of a detected target from frame center.
///
/// The three components are only meaningful together. Absence of a target is
/// expressed as `Option<OffsetVector>::None`, never as a partially filled value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetVector {
    /// X offset of the target center from frame center (pixels, +right)
    pub dx: f64,
    /// Y offset of the target center from frame center (pixels, +down)
    pub dy: f64,
    /// Rotation of the target's bounding rectangle (degrees)
    pub tilt: f64,
}

impl OffsetVector {
    /// Create a new offset vector
    pub fn new(dx: f64, dy: f64, tilt: f64) -> Self {
        Self { dx, dy, tilt }
    }

    /// Components as `[dx, dy, tilt]`
    pub fn as_array(&self) -> [f64; 3] {
        [self.dx, self.dy, self.tilt]
    }

    /// Build from `[dx, dy, tilt]`
    pub fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    /// True when every component is a finite number
    pub fn is_finite(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite() && self.tilt.is_finite()
    }
}

impl From<[f64; 3]> for OffsetVector {
    fn from(values: [f64; 3]) -> Self {
        Self::from_array(values)
    }
}

impl fmt::Display for OffsetVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.dx, self.dy, self.tilt)
    }
}
