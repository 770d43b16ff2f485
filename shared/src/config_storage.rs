//! Configuration storage for robot tuning data.
//!
//! Provides centralized storage for JSON configuration documents such as
//! vision thresholds, camera geometry and controller tolerances.
//! All config is stored in ~/.aim_config/ by default.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the document holding the whole robot configuration.
///
/// Each subsystem reads its own top-level section with
/// [`ConfigStorage::load_section`].
pub const ROBOT_CONFIG_NAME: &str = "robot";

/// Errors raised while loading or saving configuration documents.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Filesystem failure reading or writing a document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document exists but is not valid JSON for the requested type
    #[error("Invalid config document: {0}")]
    Json(#[from] serde_json::Error),

    /// No home directory to derive the default root from
    #[error("HOME not set")]
    HomeNotSet,

    /// Name would escape the storage root or collide with the file extension
    #[error("Invalid config name: {0}")]
    InvalidName(String),
}

/// Configuration storage manager.
///
/// Manages loading and saving of named JSON documents from a centralized
/// directory (defaults to ~/.aim_config/).
#[derive(Debug, Clone)]
pub struct ConfigStorage {
    /// Root directory for all configuration (e.g., ~/.aim_config)
    root_path: PathBuf,
}

impl ConfigStorage {
    /// Create a new config storage with default path (~/.aim_config)
    pub fn new() -> Result<Self, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::HomeNotSet)?;
        let root_path = PathBuf::from(home).join(".aim_config");
        Ok(Self { root_path })
    }

    /// Create a new config storage with custom root path
    pub fn with_path(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Get the root configuration path
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Path of the document stored under `name`
    pub fn document_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        if name.is_empty() || name.contains(['/', '\\', '.']) {
            return Err(ConfigError::InvalidName(name.to_string()));
        }
        Ok(self.root_path.join(format!("{name}.json")))
    }

    /// Load the document stored under `name`.
    ///
    /// Returns None if no document exists.
    /// Returns Some(Err) if the file exists but cannot be loaded.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Option<Result<T, ConfigError>> {
        let path = match self.document_path(name) {
            Ok(path) => path,
            Err(e) => return Some(Err(e)),
        };

        if !path.exists() {
            return None;
        }

        Some(Self::read_document(&path))
    }

    /// Load the document stored under `name`, falling back to `T::default()`
    /// when it does not exist.
    pub fn load_or_default<T: DeserializeOwned + Default>(
        &self,
        name: &str,
    ) -> Result<T, ConfigError> {
        self.load(name).unwrap_or_else(|| Ok(T::default()))
    }

    /// Load one top-level section of the document stored under `name`.
    ///
    /// A missing document or section yields `T::default()`, so tools that
    /// only need part of the robot configuration share one file.
    pub fn load_section<T: DeserializeOwned + Default>(
        &self,
        name: &str,
        section: &str,
    ) -> Result<T, ConfigError> {
        let document: serde_json::Value = self.load_or_default(name)?;
        match document.get(section) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(T::default()),
        }
    }

    /// Save a document under `name`.
    ///
    /// Creates the root directory if it doesn't exist.
    /// Returns the path where the document was saved.
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, ConfigError> {
        let path = self.document_path(name)?;
        std::fs::create_dir_all(&self.root_path)?;

        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, json)?;
        log::debug!("Saved config document {name} to {}", path.display());
        Ok(path)
    }

    /// List the names of all stored documents.
    pub fn list(&self) -> Result<Vec<String>, ConfigError> {
        if !self.root_path.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root_path)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete the document stored under `name`.
    ///
    /// Returns Ok(true) if the file was deleted, Ok(false) if it didn't exist.
    pub fn delete(&self, name: &str) -> Result<bool, ConfigError> {
        let path = self.document_path(name)?;

        if !path.exists() {
            return Ok(false);
        }

        std::fs::remove_file(path)?;
        Ok(true)
    }

    fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CameraGeometry;
    use tempfile::TempDir;

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::with_path(temp_dir.path().to_path_buf());

        let geometry = CameraGeometry {
            tilt_angle: 22.5,
            ..Default::default()
        };
        let path = storage.save("camera", &geometry).unwrap();
        assert!(path.ends_with("camera.json"));

        let loaded: CameraGeometry = storage.load("camera").unwrap().unwrap();
        assert_eq!(loaded, geometry);
    }

    #[test]
    fn test_missing_document() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::with_path(temp_dir.path().join("nested"));

        assert!(storage.load::<CameraGeometry>("camera").is_none());
        let fallback: CameraGeometry = storage.load_or_default("camera").unwrap();
        assert_eq!(fallback, CameraGeometry::default());
        assert!(storage.list().unwrap().is_empty());
        assert!(!storage.delete("camera").unwrap());
    }

    #[test]
    fn test_corrupt_document_reports_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::with_path(temp_dir.path().to_path_buf());
        std::fs::write(temp_dir.path().join("camera.json"), "{ not json").unwrap();

        let result = storage.load::<CameraGeometry>("camera");
        assert!(matches!(result, Some(Err(ConfigError::Json(_)))));
    }

    #[test]
    fn test_load_section() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::with_path(temp_dir.path().to_path_buf());

        let missing: CameraGeometry = storage.load_section(ROBOT_CONFIG_NAME, "camera").unwrap();
        assert_eq!(missing, CameraGeometry::default());

        let geometry = CameraGeometry {
            camera_height: 14.0,
            ..Default::default()
        };
        let document = serde_json::json!({ "camera": geometry, "other": { "x": 1 } });
        storage.save(ROBOT_CONFIG_NAME, &document).unwrap();

        let loaded: CameraGeometry = storage.load_section(ROBOT_CONFIG_NAME, "camera").unwrap();
        assert_eq!(loaded, geometry);
        let absent: CameraGeometry = storage.load_section(ROBOT_CONFIG_NAME, "lens").unwrap();
        assert_eq!(absent, CameraGeometry::default());
        assert!(matches!(
            storage.load_section::<CameraGeometry>(ROBOT_CONFIG_NAME, "other"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_list_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::with_path(temp_dir.path().to_path_buf());

        storage.save("b_doc", &1u32).unwrap();
        storage.save("a_doc", &2u32).unwrap();
        assert_eq!(storage.list().unwrap(), vec!["a_doc", "b_doc"]);

        assert!(storage.delete("a_doc").unwrap());
        assert_eq!(storage.list().unwrap(), vec!["b_doc"]);
    }

    #[test]
    fn test_rejects_path_like_names() {
        let storage = ConfigStorage::with_path(PathBuf::from("/tmp/unused"));
        assert!(matches!(
            storage.document_path("../escape"),
            Err(ConfigError::InvalidName(_))
        ));
        assert!(matches!(
            storage.document_path(""),
            Err(ConfigError::InvalidName(_))
        ));
    }
}
