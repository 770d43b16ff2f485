//! Controller tuning and the aggregated robot configuration document.

use serde::{Deserialize, Serialize};
use shared::geometry::CAMERA_VIEWING_ANGLE_X;
use shared::{CameraGeometry, ConfigError, ConfigStorage};
use telemetry::TelemetryConfig;
use vision::LocatorConfig;

/// Largest residual heading error (degrees) accepted as "on target"
pub const MAX_DEGREES_OFF_AUTO_AIMING: f64 = 2.0;

pub use shared::ROBOT_CONFIG_NAME;

/// Speed ramp for one rotation style.
///
/// `speed = base + gain * (|error| / half_fov)^2`, clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationProfile {
    pub base: f64,
    pub gain: f64,
}

impl RotationProfile {
    pub const GENTLE: Self = Self {
        base: 0.53,
        gain: 0.15,
    };

    pub const NORMAL: Self = Self {
        base: 0.60,
        gain: 0.30,
    };

    pub fn speed(&self, degrees_to_move: f64, half_viewing_angle: f64) -> f64 {
        let remaining = (degrees_to_move / half_viewing_angle).abs();
        (self.base + self.gain * remaining.powi(2)).clamp(0.0, 1.0)
    }
}

/// Per-instance controller settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AimConfig {
    /// Use the gentle ramp instead of the normal one
    pub gentle: bool,
    /// Success threshold on the residual error (degrees)
    pub tolerance: f64,
    /// Drive the on-target signal lights
    pub use_signal_lights: bool,
    /// Camera horizontal field of view; half of it scales the speed ramp
    pub viewing_angle_x: f64,
}

impl Default for AimConfig {
    fn default() -> Self {
        Self {
            gentle: false,
            tolerance: MAX_DEGREES_OFF_AUTO_AIMING,
            use_signal_lights: false,
            viewing_angle_x: CAMERA_VIEWING_ANGLE_X,
        }
    }
}

impl AimConfig {
    pub fn profile(&self) -> RotationProfile {
        if self.gentle {
            RotationProfile::GENTLE
        } else {
            RotationProfile::NORMAL
        }
    }

    pub fn half_viewing_angle(&self) -> f64 {
        self.viewing_angle_x / 2.0
    }
}

/// Everything the robot side needs, stored as one JSON document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub camera: CameraGeometry,
    pub locator: LocatorConfig,
    pub telemetry: TelemetryConfig,
    pub aim: AimConfig,
}

impl RobotConfig {
    /// Load the stored document, or defaults when none was saved yet.
    pub fn load(storage: &ConfigStorage) -> Result<Self, ConfigError> {
        storage.load_or_default(ROBOT_CONFIG_NAME)
    }

    pub fn save(&self, storage: &ConfigStorage) -> Result<(), ConfigError> {
        storage.save(ROBOT_CONFIG_NAME, self).map(|_| ())
    }

    /// Controller settings with the field of view taken from the camera
    pub fn aim_for_camera(&self) -> AimConfig {
        AimConfig {
            viewing_angle_x: self.camera.viewing_angle_x,
            ..self.aim.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_profile_speeds() {
        let half = CAMERA_VIEWING_ANGLE_X / 2.0;
        assert_relative_eq!(RotationProfile::NORMAL.speed(0.0, half), 0.60, epsilon = 1e-12);
        assert_relative_eq!(RotationProfile::GENTLE.speed(0.0, half), 0.53, epsilon = 1e-12);
        assert_relative_eq!(RotationProfile::NORMAL.speed(half, half), 0.90, epsilon = 1e-12);
        assert_relative_eq!(RotationProfile::GENTLE.speed(-half, half), 0.68, epsilon = 1e-12);
        // Far outside the frame the ramp saturates
        assert_eq!(RotationProfile::NORMAL.speed(180.0, half), 1.0);
    }

    #[test]
    fn test_aim_config_defaults() {
        let config = AimConfig::default();
        assert_eq!(config.tolerance, MAX_DEGREES_OFF_AUTO_AIMING);
        assert_eq!(config.profile(), RotationProfile::NORMAL);
        assert_relative_eq!(config.half_viewing_angle(), 30.5);
    }

    #[test]
    fn test_robot_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ConfigStorage::with_path(dir.path().to_path_buf());

        assert_eq!(RobotConfig::load(&storage).unwrap(), RobotConfig::default());

        let mut config = RobotConfig::default();
        config.aim.gentle = true;
        config.telemetry.address = "127.0.0.1:7123".to_string();
        config.locator.min_area = 150.0;
        config.save(&storage).unwrap();

        assert_eq!(RobotConfig::load(&storage).unwrap(), config);
    }

    #[test]
    fn test_sections_read_by_other_tools() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ConfigStorage::with_path(dir.path().to_path_buf());

        let mut config = RobotConfig::default();
        config.locator.min_area = 150.0;
        config.telemetry.address = "127.0.0.1:7123".to_string();
        config.camera.tilt_angle = 30.0;
        config.save(&storage).unwrap();

        let locator: LocatorConfig = storage.load_section(ROBOT_CONFIG_NAME, "locator").unwrap();
        let telemetry: TelemetryConfig =
            storage.load_section(ROBOT_CONFIG_NAME, "telemetry").unwrap();
        let camera: CameraGeometry = storage.load_section(ROBOT_CONFIG_NAME, "camera").unwrap();
        assert_eq!(locator, config.locator);
        assert_eq!(telemetry, config.telemetry);
        assert_eq!(camera, config.camera);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: RobotConfig = serde_json::from_str(r#"{"aim": {"tolerance": 1.0}}"#).unwrap();
        assert_eq!(config.aim.tolerance, 1.0);
        assert!(!config.aim.gentle);
        assert_eq!(config.camera, CameraGeometry::default());
    }
}
