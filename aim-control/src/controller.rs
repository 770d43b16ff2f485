//! Closed-loop rotation toward a target heading.
//!
//! [`RotationalAim`] is a command-style state machine driven once per control
//! cycle by [`tick`](RotationalAim::tick):
//!
//! ```text
//! Init --initialize--> completion test --finished--> end --> Done
//!                           |  ^
//!                     not finished
//!                           v  |
//!                 Running: execute (one drive command)
//! ```
//!
//! The completion test runs before every drive command. Internal faults never
//! propagate: they latch an abort flag and the controller finishes, stopping
//! the chassis. [`AimOutcome`] records why it finished.

use std::fmt;

use log::{debug, info, warn};

use crate::config::AimConfig;
use crate::diagnostics::{Diagnostics, NullDiagnostics};
use crate::force_stop::ForceStop;
use crate::hardware::{ChassisHandles, HardwareError, SignalLights};
use crate::policy::{AimDecision, AimError, AnglePolicy};

/// Desired angles smaller than this mean "nothing to do"
pub const DESIRED_ANGLE_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AimPhase {
    Init,
    Running,
    Done,
}

/// Why a controller finished.
///
/// The chassis is stopped the same way for every outcome; only callers that
/// care (retry on fault, accept no target) need to tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AimOutcome {
    /// Residual error fell inside the tolerance
    OnTarget,
    /// The policy found no viable target
    NoTarget,
    /// The policy asked for a zero rotation
    NothingToDo,
    /// An unexpected fault latched the abort flag
    Aborted,
    /// The force stop token was set
    ForceStopped,
    /// Preempted by another user of the chassis
    Interrupted,
}

impl AimOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::OnTarget)
    }
}

impl fmt::Display for AimOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            Self::OnTarget => "on target",
            Self::NoTarget => "no target",
            Self::NothingToDo => "nothing to do",
            Self::Aborted => "aborted",
            Self::ForceStopped => "force stopped",
            Self::Interrupted => "interrupted",
        };
        f.write_str(text)
    }
}

/// Per-session state, rebuilt by every Init
#[derive(Debug, Clone)]
struct AimSession {
    desired_angle: f64,
    proceed: bool,
    abort: bool,
    prior_high_gear: Option<bool>,
}

impl Default for AimSession {
    fn default() -> Self {
        Self {
            desired_angle: 0.0,
            proceed: true,
            abort: false,
            prior_high_gear: None,
        }
    }
}

/// Map a heading in `[0, 360)` onto `(-180, 180]` so the error stays
/// continuous when the robot turns left past zero.
pub fn normalize_heading(reading: f64) -> f64 {
    if reading > 180.0 {
        reading - 360.0
    } else {
        reading
    }
}

/// Rotates the chassis until the heading error is inside the tolerance.
pub struct RotationalAim {
    chassis: ChassisHandles,
    policy: Box<dyn AnglePolicy>,
    config: AimConfig,
    force_stop: ForceStop,
    lights: Option<Box<dyn SignalLights>>,
    diagnostics: Box<dyn Diagnostics>,
    phase: AimPhase,
    session: AimSession,
    pending_outcome: Option<AimOutcome>,
    outcome: Option<AimOutcome>,
}

impl RotationalAim {
    pub fn new(chassis: ChassisHandles, policy: Box<dyn AnglePolicy>, config: AimConfig) -> Self {
        Self {
            chassis,
            policy,
            config,
            force_stop: ForceStop::new(),
            lights: None,
            diagnostics: Box::new(NullDiagnostics),
            phase: AimPhase::Init,
            session: AimSession::default(),
            pending_outcome: None,
            outcome: None,
        }
    }

    /// Use an externally owned cancellation token
    pub fn with_force_stop(mut self, force_stop: ForceStop) -> Self {
        self.force_stop = force_stop;
        self
    }

    /// Indicators toggled when `use_signal_lights` is set
    pub fn with_signal_lights(mut self, lights: Box<dyn SignalLights>) -> Self {
        self.lights = Some(lights);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Box<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn phase(&self) -> AimPhase {
        self.phase
    }

    /// Set once the controller reaches Done
    pub fn outcome(&self) -> Option<AimOutcome> {
        self.outcome
    }

    pub fn desired_angle(&self) -> f64 {
        self.session.desired_angle
    }

    pub fn force_stop(&self) -> &ForceStop {
        &self.force_stop
    }

    /// Give the chassis back once the controller is done with it
    pub fn into_chassis(self) -> ChassisHandles {
        self.chassis
    }

    /// Advance one control cycle and report the phase afterwards.
    pub fn tick(&mut self) -> AimPhase {
        match self.phase {
            AimPhase::Done => return AimPhase::Done,
            AimPhase::Init => {
                self.initialize();
                self.phase = AimPhase::Running;
            }
            AimPhase::Running => {}
        }

        if self.is_finished() {
            self.end();
        } else {
            self.execute();
        }
        self.phase
    }

    /// Start a session: snapshot the gear, zero the heading and ask the
    /// policy for the desired angle. Faults latch abort.
    pub fn initialize(&mut self) {
        self.session = AimSession::default();
        self.pending_outcome = None;
        self.outcome = None;

        if self.force_stop.is_stopped() {
            debug!("Force stopped before {} aim started", self.policy.name());
            return;
        }

        if let Err(e) = self.try_initialize() {
            warn!("Aborting {} aim during initialize: {}", self.policy.name(), e);
            self.session.abort = true;
        }
    }

    fn try_initialize(&mut self) -> Result<(), AimError> {
        self.session.prior_high_gear = Some(self.chassis.gears.is_high_gear()?);
        self.chassis.heading.reset()?;

        match self.policy.desired_angle()? {
            AimDecision::Rotate(degrees) => self.session.desired_angle = degrees,
            AimDecision::NoTarget => self.session.proceed = false,
        }

        self.diagnostics
            .put_number("desired angle", self.session.desired_angle);
        info!(
            "Starting {} aim: desired {:.2} deg, proceed {}",
            self.policy.name(),
            self.session.desired_angle,
            self.session.proceed
        );
        Ok(())
    }

    fn angle_moved(&mut self) -> Result<f64, HardwareError> {
        Ok(normalize_heading(self.chassis.heading.angle()?))
    }

    fn degrees_to_move(&mut self) -> Result<f64, HardwareError> {
        Ok(self.session.desired_angle - self.angle_moved()?)
    }

    /// Issue one drive command toward the desired heading. Faults latch abort.
    pub fn execute(&mut self) {
        if self.force_stop.is_stopped() {
            return;
        }
        if let Err(e) = self.try_execute() {
            warn!("Aborting {} aim during execute: {}", self.policy.name(), e);
            self.session.abort = true;
        }
    }

    fn try_execute(&mut self) -> Result<(), HardwareError> {
        let degrees = self.degrees_to_move()?;
        let speed = self
            .config
            .profile()
            .speed(degrees, self.config.half_viewing_angle());
        debug!("degrees to move {degrees:.2}, speed {speed:.3}");

        if degrees < 0.0 {
            self.chassis.drive.tank_drive(-speed, speed)
        } else {
            self.chassis.drive.tank_drive(speed, -speed)
        }
    }

    /// Completion test. Records why the controller is finishing.
    pub fn is_finished(&mut self) -> bool {
        match self.check_finished() {
            Ok(Some(outcome)) => {
                self.pending_outcome = Some(outcome);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Aborting {} aim during completion test: {}", self.policy.name(), e);
                self.session.abort = true;
                self.pending_outcome = Some(AimOutcome::Aborted);
                true
            }
        }
    }

    fn check_finished(&mut self) -> Result<Option<AimOutcome>, HardwareError> {
        if self.force_stop.is_stopped() {
            return Ok(Some(AimOutcome::ForceStopped));
        }

        let give_up = if self.session.abort {
            Some(AimOutcome::Aborted)
        } else if !self.session.proceed {
            Some(AimOutcome::NoTarget)
        } else if self.session.desired_angle.abs() < DESIRED_ANGLE_EPSILON {
            // A failsafe for a zero request, not a judgment of success
            Some(AimOutcome::NothingToDo)
        } else {
            None
        };
        if let Some(outcome) = give_up {
            self.update_lights(|lights| lights.set_steady(false));
            debug!(
                "Giving up: proceed {}, desired {:.3}",
                self.session.proceed, self.session.desired_angle
            );
            return Ok(Some(outcome));
        }

        let degrees_off = self.degrees_to_move()?;
        let on_target = degrees_off.abs() < self.config.tolerance;
        self.diagnostics.put_number("degrees off", degrees_off);
        self.diagnostics.put_bool("on target", on_target);
        if self.config.use_signal_lights {
            self.update_lights(|lights| {
                lights.set_steady(on_target)?;
                lights.set_blinking(on_target)
            });
        }

        Ok(on_target.then_some(AimOutcome::OnTarget))
    }

    /// Light failures are logged and never change the control decision.
    fn update_lights(
        &mut self,
        update: impl FnOnce(&mut dyn SignalLights) -> Result<(), HardwareError>,
    ) {
        if let Some(lights) = self.lights.as_deref_mut() {
            if let Err(e) = update(lights) {
                warn!("Signal light update failed: {e}");
            }
        }
    }

    /// Stop the chassis, restore the gear snapshot and run the policy's
    /// completion hook.
    pub fn end(&mut self) {
        if let Err(e) = self.chassis.drive.stop() {
            warn!("Failed to stop chassis: {e}");
        }
        if let Some(high) = self.session.prior_high_gear {
            if let Err(e) = self.chassis.gears.set_high_gear(high) {
                warn!("Failed to restore gear: {e}");
            }
        }

        let outcome = self
            .pending_outcome
            .take()
            .unwrap_or_else(|| {
                if self.force_stop.is_stopped() {
                    AimOutcome::ForceStopped
                } else {
                    AimOutcome::Aborted
                }
            });
        self.policy.on_end(outcome);
        self.diagnostics.put_string("aim outcome", &outcome.to_string());
        info!("{} aim finished: {}", self.policy.name(), outcome);

        self.outcome = Some(outcome);
        self.phase = AimPhase::Done;
    }

    /// Preempted: zero the drive immediately, skip the cleanup hook.
    /// A finished controller no longer owns the drive and ignores this.
    pub fn interrupt(&mut self) {
        if self.phase == AimPhase::Done {
            return;
        }
        if let Err(e) = self.chassis.drive.tank_drive(0.0, 0.0) {
            warn!("Failed to zero drive on interrupt: {e}");
        }
        info!("{} aim interrupted", self.policy.name());
        self.outcome = Some(AimOutcome::Interrupted);
        self.phase = AimPhase::Done;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_heading() {
        assert_eq!(normalize_heading(0.0), 0.0);
        assert_eq!(normalize_heading(90.0), 90.0);
        assert_eq!(normalize_heading(180.0), 180.0);
        assert_eq!(normalize_heading(181.0), -179.0);
        assert_eq!(normalize_heading(359.5), -0.5);
    }

    #[test]
    fn test_only_on_target_is_success() {
        assert!(AimOutcome::OnTarget.is_success());
        for outcome in [
            AimOutcome::NoTarget,
            AimOutcome::NothingToDo,
            AimOutcome::Aborted,
            AimOutcome::ForceStopped,
            AimOutcome::Interrupted,
        ] {
            assert!(!outcome.is_success());
        }
    }
}
