//! In-memory chassis for tests and bench runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::hardware::{
    ChassisHandles, DriveActuator, GearShift, HardwareError, HeadingSensor, SignalLights,
};

/// Heading change per drive command at full differential speed (degrees)
pub const DEFAULT_TURN_RATE: f64 = 4.0;

#[derive(Debug, Clone, Default)]
struct SimState {
    /// Heading relative to the last reset, `[0, 360)`
    heading: f64,
    turn_rate: f64,
    high_gear: bool,
    steady_light: bool,
    blinking_light: bool,
    drive_log: Vec<(f64, f64)>,
    heading_resets: usize,
    heading_fault: bool,
    drive_fault: bool,
}

/// Simulated tank chassis implementing every hardware interface.
///
/// Clones share state, so a test can hand boxed clones to a controller and
/// keep one to inspect commands and steer the heading. Each drive command
/// turns the chassis by `turn_rate * (left - right) / 2` degrees.
#[derive(Debug, Clone)]
pub struct SimulatedChassis {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimulatedChassis {
    fn default() -> Self {
        Self::new(DEFAULT_TURN_RATE)
    }
}

impl SimulatedChassis {
    pub fn new(turn_rate: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                turn_rate,
                ..Default::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Boxed handles for a controller, sharing this chassis's state
    pub fn handles(&self) -> ChassisHandles {
        ChassisHandles::new(
            Box::new(self.clone()),
            Box::new(self.clone()),
            Box::new(self.clone()),
        )
    }

    pub fn heading(&self) -> f64 {
        self.state().heading
    }

    /// Force the heading reading, e.g. to emulate an external push
    pub fn set_heading(&self, degrees: f64) {
        self.state().heading = degrees.rem_euclid(360.0);
    }

    pub fn high_gear(&self) -> bool {
        self.state().high_gear
    }

    pub fn set_gear(&self, high: bool) {
        self.state().high_gear = high;
    }

    /// Every `(left, right)` command received, oldest first
    pub fn drive_log(&self) -> Vec<(f64, f64)> {
        self.state().drive_log.clone()
    }

    /// Most recent drive command
    pub fn last_drive(&self) -> Option<(f64, f64)> {
        self.state().drive_log.last().copied()
    }

    pub fn heading_resets(&self) -> usize {
        self.state().heading_resets
    }

    pub fn lights(&self) -> (bool, bool) {
        let state = self.state();
        (state.steady_light, state.blinking_light)
    }

    /// Make heading reads and resets fail
    pub fn set_heading_fault(&self, fault: bool) {
        self.state().heading_fault = fault;
    }

    /// Make drive commands fail
    pub fn set_drive_fault(&self, fault: bool) {
        self.state().drive_fault = fault;
    }
}

impl HeadingSensor for SimulatedChassis {
    fn reset(&mut self) -> Result<(), HardwareError> {
        let mut state = self.state();
        if state.heading_fault {
            return Err(HardwareError::NotResponding {
                device: "gyro".to_string(),
            });
        }
        state.heading = 0.0;
        state.heading_resets += 1;
        Ok(())
    }

    fn angle(&mut self) -> Result<f64, HardwareError> {
        let state = self.state();
        if state.heading_fault {
            return Err(HardwareError::NotResponding {
                device: "gyro".to_string(),
            });
        }
        Ok(state.heading)
    }
}

impl DriveActuator for SimulatedChassis {
    fn tank_drive(&mut self, left: f64, right: f64) -> Result<(), HardwareError> {
        let mut state = self.state();
        if state.drive_fault {
            return Err(HardwareError::fault("drivetrain", "motor controller fault"));
        }
        let (left, right) = (left.clamp(-1.0, 1.0), right.clamp(-1.0, 1.0));
        state.drive_log.push((left, right));
        let turned = state.turn_rate * (left - right) / 2.0;
        state.heading = (state.heading + turned).rem_euclid(360.0);
        Ok(())
    }
}

impl GearShift for SimulatedChassis {
    fn is_high_gear(&mut self) -> Result<bool, HardwareError> {
        Ok(self.state().high_gear)
    }

    fn set_high_gear(&mut self, high: bool) -> Result<(), HardwareError> {
        self.state().high_gear = high;
        Ok(())
    }
}

impl SignalLights for SimulatedChassis {
    fn set_steady(&mut self, on: bool) -> Result<(), HardwareError> {
        self.state().steady_light = on;
        Ok(())
    }

    fn set_blinking(&mut self, on: bool) -> Result<(), HardwareError> {
        self.state().blinking_light = on;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tank_drive_turns_chassis() {
        let mut chassis = SimulatedChassis::new(10.0);
        chassis.tank_drive(0.5, -0.5).unwrap();
        assert_relative_eq!(chassis.heading(), 5.0);

        chassis.tank_drive(-1.0, 1.0).unwrap();
        assert_relative_eq!(chassis.heading(), 355.0);
        assert_eq!(chassis.drive_log().len(), 2);
    }

    #[test]
    fn test_stop_records_zero_command() {
        let mut chassis = SimulatedChassis::default();
        chassis.stop().unwrap();
        assert_eq!(chassis.last_drive(), Some((0.0, 0.0)));
        assert_eq!(chassis.heading(), 0.0);
    }

    #[test]
    fn test_faults() {
        let mut chassis = SimulatedChassis::default();
        chassis.set_heading_fault(true);
        assert!(chassis.angle().is_err());
        assert!(HeadingSensor::reset(&mut chassis).is_err());

        chassis.set_drive_fault(true);
        assert!(chassis.tank_drive(0.5, 0.5).is_err());
        assert!(chassis.drive_log().is_empty());
    }

    #[test]
    fn test_handles_share_state() {
        let chassis = SimulatedChassis::default();
        let mut handles = chassis.handles();
        handles.gears.set_high_gear(true).unwrap();
        assert!(chassis.high_gear());

        chassis.set_heading(-10.0);
        assert_relative_eq!(handles.heading.angle().unwrap(), 350.0);
    }
}
