//! Configuration module for photo-album
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_VAR: &str = "PHOTO_ALBUM_SETTINGS_PATH";

/// Load settings from an explicit path, the environment, or the default locations
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        return load_from(path);
    }

    if let Ok(path) = std::env::var(SETTINGS_PATH_VAR) {
        let path = PathBuf::from(path);
        if path.exists() {
            return load_from(&path);
        }
    }

    for path in default_paths() {
        if path.exists() {
            return load_from(&path);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}

fn load_from(path: &Path) -> Result<Settings> {
    info!("Loading settings from: {}", path.display());
    let mut settings = Settings::from_file(path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    settings.merge_env();
    Ok(settings)
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("photo-album/settings.yml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api:\n  base_url: https://example.com/prod").unwrap();

        let settings = load(Some(file.path())).unwrap();
        assert!(settings.api.base_url.starts_with("https://"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = load(Some(Path::new("/nonexistent/photo-album.yml")));
        assert!(result.is_err());
    }
}
