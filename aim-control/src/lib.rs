//! Vision-guided rotational aiming.
//!
//! [`RotationalAim`] turns the chassis in place until the heading error to a
//! target is within tolerance. How far to turn comes from an injected
//! [`AnglePolicy`]: a fixed heading, or the vision target read from a
//! telemetry slot, a telemetry channel or a local vision module.
//!
//! Hardware is reached only through the traits in [`hardware`], handed to
//! the controller at construction.

pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod force_stop;
pub mod hardware;
pub mod policy;
pub mod sim;

pub use config::{AimConfig, RobotConfig, RotationProfile, MAX_DEGREES_OFF_AUTO_AIMING};
pub use controller::{AimOutcome, AimPhase, RotationalAim};
pub use diagnostics::{Diagnostics, LogDiagnostics, NullDiagnostics};
pub use force_stop::ForceStop;
pub use hardware::{
    ChassisHandles, DriveActuator, GearShift, HardwareError, HeadingSensor, SignalLights,
};
pub use policy::{AimDecision, AimError, AnglePolicy, FixedHeading, OffsetSource, VisionTarget};
pub use sim::SimulatedChassis;
