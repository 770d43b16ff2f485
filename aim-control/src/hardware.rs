//! Hardware interfaces the aiming controller drives.
//!
//! Abstracts the chassis for testability: the controller only sees these
//! traits, and [`SimulatedChassis`](crate::sim::SimulatedChassis) implements
//! them all for tests and bench runs.

use thiserror::Error;

/// Failure reported by a hardware interface
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HardwareError {
    /// Device did not answer
    #[error("{device} not responding")]
    NotResponding { device: String },

    /// Device answered with something unusable
    #[error("{device} fault: {message}")]
    Fault { device: String, message: String },
}

impl HardwareError {
    pub fn fault(device: &str, message: impl Into<String>) -> Self {
        Self::Fault {
            device: device.to_string(),
            message: message.into(),
        }
    }
}

/// Yaw sensor (gyro)
pub trait HeadingSensor {
    /// Make the current heading the zero reference
    fn reset(&mut self) -> Result<(), HardwareError>;

    /// Heading since the last reset, degrees in `[0, 360)`, clockwise positive
    fn angle(&mut self) -> Result<f64, HardwareError>;
}

/// Differential (tank) drive
pub trait DriveActuator {
    /// Command both sides; speeds in `[-1.0, 1.0]`
    fn tank_drive(&mut self, left: f64, right: f64) -> Result<(), HardwareError>;

    fn stop(&mut self) -> Result<(), HardwareError> {
        self.tank_drive(0.0, 0.0)
    }
}

/// Drive transmission gear selection
pub trait GearShift {
    fn is_high_gear(&mut self) -> Result<bool, HardwareError>;

    fn set_high_gear(&mut self, high: bool) -> Result<(), HardwareError>;
}

/// Operator-facing "on target" indicators
pub trait SignalLights {
    fn set_steady(&mut self, on: bool) -> Result<(), HardwareError>;

    fn set_blinking(&mut self, on: bool) -> Result<(), HardwareError>;
}

/// The chassis resources a controller owns while it runs
pub struct ChassisHandles {
    pub heading: Box<dyn HeadingSensor>,
    pub drive: Box<dyn DriveActuator>,
    pub gears: Box<dyn GearShift>,
}

impl ChassisHandles {
    pub fn new(
        heading: Box<dyn HeadingSensor>,
        drive: Box<dyn DriveActuator>,
        gears: Box<dyn GearShift>,
    ) -> Self {
        Self {
            heading,
            drive,
            gears,
        }
    }
}
