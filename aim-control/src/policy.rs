//! Strategies that decide how far the controller should rotate.

use log::debug;
use shared::{CameraGeometry, OffsetVector};
use telemetry::{TelemetryChannel, TelemetrySlot};
use thiserror::Error;
use vision::{FrameSource, VisionError, VisionModule};

use crate::controller::AimOutcome;
use crate::hardware::HardwareError;

/// Unexpected failures inside the controller or a policy.
///
/// Any of these latches the controller's abort flag.
#[derive(Error, Debug)]
pub enum AimError {
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    #[error("Vision error: {0}")]
    Vision(#[from] VisionError),

    #[error("Policy error: {0}")]
    Policy(String),
}

/// What a policy wants the controller to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimDecision {
    /// Rotate this many degrees, clockwise positive. Zero means nothing to do.
    Rotate(f64),
    /// No viable target; finish without moving
    NoTarget,
}

/// Per-target angle computation injected into [`RotationalAim`](crate::RotationalAim).
pub trait AnglePolicy {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Called once at the start of each aim session
    fn desired_angle(&mut self) -> Result<AimDecision, AimError>;

    /// Called once when the session finishes (not on interruption)
    fn on_end(&mut self, _outcome: AimOutcome) {}
}

/// Rotate by a fixed amount
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedHeading {
    pub degrees: f64,
}

impl FixedHeading {
    pub fn new(degrees: f64) -> Self {
        Self { degrees }
    }
}

impl AnglePolicy for FixedHeading {
    fn name(&self) -> &str {
        "fixed heading"
    }

    fn desired_angle(&mut self) -> Result<AimDecision, AimError> {
        Ok(AimDecision::Rotate(self.degrees))
    }
}

/// Anything that can supply the latest target offset
pub trait OffsetSource {
    fn latest_offset(&mut self) -> Result<Option<OffsetVector>, AimError>;
}

impl OffsetSource for TelemetrySlot {
    fn latest_offset(&mut self) -> Result<Option<OffsetVector>, AimError> {
        Ok(self.latest())
    }
}

impl OffsetSource for TelemetryChannel {
    fn latest_offset(&mut self) -> Result<Option<OffsetVector>, AimError> {
        Ok(self.latest())
    }
}

/// Runs the locator on a fresh frame from the module's source
impl<S: FrameSource> OffsetSource for VisionModule<S> {
    fn latest_offset(&mut self) -> Result<Option<OffsetVector>, AimError> {
        Ok(self.process_image()?)
    }
}

/// Rotate to face the vision target
pub struct VisionTarget<S: OffsetSource> {
    source: S,
    geometry: CameraGeometry,
}

impl<S: OffsetSource> VisionTarget<S> {
    pub fn new(source: S, geometry: CameraGeometry) -> Self {
        Self { source, geometry }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: OffsetSource> AnglePolicy for VisionTarget<S> {
    fn name(&self) -> &str {
        "vision target"
    }

    fn desired_angle(&mut self) -> Result<AimDecision, AimError> {
        match self.source.latest_offset()? {
            Some(vector) => {
                let degrees = self.geometry.frame_x_px_to_degrees(vector.dx);
                debug!(
                    "Target at {vector} -> {degrees:.2} deg, {:.1} in away",
                    self.geometry.distance_to_goal(vector.dy)
                );
                Ok(AimDecision::Rotate(degrees))
            }
            None => {
                debug!("No target visible");
                Ok(AimDecision::NoTarget)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_heading() {
        let mut policy = FixedHeading::new(-45.0);
        assert_eq!(policy.desired_angle().unwrap(), AimDecision::Rotate(-45.0));
    }

    #[test]
    fn test_vision_target_from_slot() {
        let slot = TelemetrySlot::new();
        let mut policy = VisionTarget::new(slot.clone(), CameraGeometry::default());

        assert_eq!(policy.desired_angle().unwrap(), AimDecision::NoTarget);

        // Right edge of a 640 px frame is half the 61 degree field of view
        slot.publish(Some(OffsetVector::new(320.0, 0.0, 0.0)));
        match policy.desired_angle().unwrap() {
            AimDecision::Rotate(degrees) => assert_relative_eq!(degrees, 30.5),
            other => panic!("unexpected decision {other:?}"),
        }

        slot.publish(Some(OffsetVector::new(0.0, 10.0, 5.0)));
        assert_eq!(policy.desired_angle().unwrap(), AimDecision::Rotate(0.0));
    }

    struct FailingSource;

    impl OffsetSource for FailingSource {
        fn latest_offset(&mut self) -> Result<Option<OffsetVector>, AimError> {
            Err(AimError::Policy("camera unplugged".to_string()))
        }
    }

    #[test]
    fn test_source_errors_propagate() {
        let mut policy = VisionTarget::new(FailingSource, CameraGeometry::default());
        assert!(matches!(policy.desired_angle(), Err(AimError::Policy(_))));
    }
}
