//! Helpers for tests that write artifacts (annotated frames, traces).

use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum TestUtilError {
    #[error("Failed to find project root: {0}")]
    ProjectRootNotFound(String),
}

pub fn find_project_root() -> Result<PathBuf, TestUtilError> {
    let mut current_dir = env::current_dir().map_err(|e| {
        TestUtilError::ProjectRootNotFound(format!("Failed to get current directory: {e}"))
    })?;

    loop {
        let cargo_toml = current_dir.join("Cargo.toml");
        if cargo_toml.exists() {
            let content = std::fs::read_to_string(&cargo_toml).map_err(|e| {
                TestUtilError::ProjectRootNotFound(format!("Failed to read Cargo.toml: {e}"))
            })?;

            if content.contains("[workspace]") {
                return Ok(current_dir);
            }
        }

        if !current_dir.pop() {
            break;
        }
    }

    Err(TestUtilError::ProjectRootNotFound(
        "Workspace root not found".to_string(),
    ))
}

static PROJECT_ROOT: Lazy<PathBuf> =
    Lazy::new(|| find_project_root().unwrap_or_else(|_| env::temp_dir()));

/// Directory for test artifacts, `<workspace>/test_output`.
///
/// Falls back to the system temp directory when no workspace root is found.
pub fn get_output_dir() -> PathBuf {
    let output_dir = PROJECT_ROOT.join("test_output");

    if let Err(e) = std::fs::create_dir_all(&output_dir) {
        log::warn!("Failed to create {}: {e}", output_dir.display());
        return env::temp_dir();
    }

    output_dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_exists() {
        let dir = get_output_dir();
        assert!(dir.exists());
    }
}
