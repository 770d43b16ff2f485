//! Shared components for the vision-guided aiming workspace.
//!
//! Holds the types that cross crate boundaries (the [`OffsetVector`] produced
//! by the vision pipeline and carried over telemetry), the camera geometry
//! used to turn pixel offsets into angles and distances, and the JSON
//! configuration storage used by the binaries.

pub mod config_storage;
pub mod geometry;
pub mod image_size;
pub mod offset_vector;
pub mod test_util;

pub use config_storage::{ConfigError, ConfigStorage, ROBOT_CONFIG_NAME};
pub use geometry::CameraGeometry;
pub use image_size::ImageSize;
pub use offset_vector::OffsetVector;
