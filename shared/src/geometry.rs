//! Camera geometry and pixel-to-world conversions.
//!
//! Converts an [`OffsetVector`] reported by the vision pipeline into the
//! rotation needed to face the goal and the distance to it. All functions
//! are pure; a missing target propagates as a `-1.0` distance sentinel
//! instead of an error.

use serde::{Deserialize, Serialize};

use crate::image_size::ImageSize;
use crate::offset_vector::OffsetVector;

/// Width of the camera frame in pixels
pub const CAMERA_FRAME_PX_WIDTH: usize = 640;
/// Height of the camera frame in pixels
pub const CAMERA_FRAME_PX_HEIGHT: usize = 480;
/// Horizontal field of view (degrees)
pub const CAMERA_VIEWING_ANGLE_X: f64 = 61.0;
/// Vertical field of view (degrees)
pub const CAMERA_VIEWING_ANGLE_Y: f64 = 45.75;
/// Upward tilt of the camera's optical axis above horizontal (degrees)
pub const CAMERA_TILT_ANGLE: f64 = 35.0;
/// Height of the camera lens above the floor (inches)
pub const CAMERA_HEIGHT_FROM_GROUND: f64 = 12.0;
/// Height of the center of the high goal target above the floor (inches)
pub const HIGH_GOAL_HEIGHT: f64 = 97.0;

/// Returned by the distance helpers when no target was found
pub const NO_TARGET_DISTANCE: f64 = -1.0;

/// Mounting and optics of the aiming camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraGeometry {
    /// Frame dimensions in pixels
    pub frame: ImageSize,
    /// Horizontal field of view (degrees)
    pub viewing_angle_x: f64,
    /// Vertical field of view (degrees)
    pub viewing_angle_y: f64,
    /// Camera tilt above horizontal (degrees)
    pub tilt_angle: f64,
    /// Camera height above ground (inches)
    pub camera_height: f64,
    /// Target height above ground (inches)
    pub goal_height: f64,
}

impl Default for CameraGeometry {
    fn default() -> Self {
        Self {
            frame: ImageSize::from_width_height(CAMERA_FRAME_PX_WIDTH, CAMERA_FRAME_PX_HEIGHT),
            viewing_angle_x: CAMERA_VIEWING_ANGLE_X,
            viewing_angle_y: CAMERA_VIEWING_ANGLE_Y,
            tilt_angle: CAMERA_TILT_ANGLE,
            camera_height: CAMERA_HEIGHT_FROM_GROUND,
            goal_height: HIGH_GOAL_HEIGHT,
        }
    }
}

impl CameraGeometry {
    /// Horizontal pixel offset from frame center to degrees of rotation.
    pub fn frame_x_px_to_degrees(&self, dx: f64) -> f64 {
        self.viewing_angle_x * dx / self.frame.width as f64
    }

    /// Vertical pixel offset from frame center to degrees below the optical axis.
    pub fn frame_y_px_to_degrees(&self, dy: f64) -> f64 {
        dy / self.frame.height as f64 * self.viewing_angle_y
    }

    /// Vertical pixel offset to elevation of the target above horizontal.
    pub fn y_in_frame_to_degrees_from_horizon(&self, dy: f64) -> f64 {
        self.tilt_angle - self.frame_y_px_to_degrees(dy)
    }

    /// Floor distance to the goal (inches) for a vertical pixel offset.
    ///
    /// Elevations at or below the horizon give non-physical (infinite or
    /// negative) distances; callers should treat those as "no usable range".
    pub fn distance_to_goal(&self, dy: f64) -> f64 {
        let angle = self.y_in_frame_to_degrees_from_horizon(dy);
        (self.goal_height - self.camera_height) / angle.to_radians().tan()
    }

    /// Floor distance for an optional vector, [`NO_TARGET_DISTANCE`] when absent.
    pub fn distance_to_goal_from(&self, vector: Option<&OffsetVector>) -> f64 {
        match vector {
            Some(v) => self.distance_to_goal(v.dy),
            None => NO_TARGET_DISTANCE,
        }
    }

    /// Rotation (degrees) needed to face an optional target.
    pub fn degrees_to_target(&self, vector: Option<&OffsetVector>) -> Option<f64> {
        vector.map(|v| self.frame_x_px_to_degrees(v.dx))
    }

    /// Half of the horizontal field of view, the scale used for speed ramping.
    pub fn half_viewing_angle_x(&self) -> f64 {
        self.viewing_angle_x / 2.0
    }
}
