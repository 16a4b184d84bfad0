//! Installer settings file.
//!
//! A JSON document with defaults for every field, so an empty `{}` is a valid
//! configuration. Command-line flags override whatever the file says.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::CleanupInterval;

/// Default location of the per-component install scripts
pub const DEFAULT_SCRIPTS_DIR: &str = "/usr/share/klipkit/scripts";
/// Default Klipper/Moonraker data root
pub const DEFAULT_PRINTER_DATA_DIR: &str = "/home/pi/printer_data";
/// Default directory for generated systemd units
pub const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";
/// Klipper writes `printer-<timestamp>.cfg` on every SAVE_CONFIG
pub const DEFAULT_BACKUP_PATTERN: &str = "printer-*.cfg";

/// Settings for the backup cleanup timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    pub interval: CleanupInterval,
    /// Directory to prune. Defaults to `<printer_data_dir>/config`.
    pub target_dir: Option<PathBuf>,
    /// Shell glob matched inside `target_dir`
    pub pattern: String,
    /// Number of newest matching files that are never deleted
    pub keep_latest: u32,
    pub unit_dir: PathBuf,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            interval: CleanupInterval::default(),
            target_dir: None,
            pattern: DEFAULT_BACKUP_PATTERN.to_string(),
            keep_latest: 5,
            unit_dir: PathBuf::from(DEFAULT_UNIT_DIR),
        }
    }
}

/// Installer settings that can be saved/loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    pub scripts_dir: PathBuf,
    pub printer_data_dir: PathBuf,
    pub cleanup: CleanupSettings,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from(DEFAULT_SCRIPTS_DIR),
            printer_data_dir: PathBuf::from(DEFAULT_PRINTER_DATA_DIR),
            cleanup: CleanupSettings::default(),
        }
    }
}

impl InstallerConfig {
    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;
        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;
        Ok(config)
    }

    /// Directory the cleanup job prunes
    pub fn cleanup_target_dir(&self) -> PathBuf {
        self.cleanup
            .target_dir
            .clone()
            .unwrap_or_else(|| self.printer_data_dir.join("config"))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.scripts_dir.as_os_str().is_empty() {
            anyhow::bail!("scripts_dir must not be empty");
        }
        if self.printer_data_dir.as_os_str().is_empty() {
            anyhow::bail!("printer_data_dir must not be empty");
        }
        if self.cleanup.unit_dir.as_os_str().is_empty() {
            anyhow::bail!("cleanup.unit_dir must not be empty");
        }
        if self.cleanup.keep_latest == 0 {
            anyhow::bail!("cleanup.keep_latest must be at least 1");
        }

        let pattern = self.cleanup.pattern.trim();
        if pattern.is_empty() {
            anyhow::bail!("cleanup.pattern must not be empty");
        }
        if pattern.contains('/') {
            anyhow::bail!("cleanup.pattern must be a file name glob, not a path");
        }
        // The pattern ends up inside a single-quoted shell word
        if pattern.contains('\'') {
            anyhow::bail!("cleanup.pattern must not contain single quotes");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = InstallerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.cleanup_target_dir(),
            PathBuf::from("/home/pi/printer_data/config")
        );
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: InstallerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, InstallerConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config: InstallerConfig = serde_json::from_str(
            r#"{ "printer_data_dir": "/srv/printer", "cleanup": { "interval": "weekly", "keep_latest": 2 } }"#,
        )
        .unwrap();
        assert_eq!(config.cleanup.interval, CleanupInterval::Weekly);
        assert_eq!(config.cleanup.keep_latest, 2);
        assert_eq!(config.cleanup.pattern, DEFAULT_BACKUP_PATTERN);
        assert_eq!(config.cleanup_target_dir(), PathBuf::from("/srv/printer/config"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("klipkit.json");
        let mut config = InstallerConfig::default();
        config.cleanup.target_dir = Some(PathBuf::from("/backups"));

        config.save_to_file(&path).unwrap();
        assert_eq!(InstallerConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = InstallerConfig::load_from_file("/nonexistent/klipkit.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration"));
    }

    #[test]
    fn test_validate_rejects_bad_cleanup() {
        let mut config = InstallerConfig::default();
        config.cleanup.keep_latest = 0;
        assert!(config.validate().is_err());

        let mut config = InstallerConfig::default();
        config.cleanup.pattern = "../*.cfg".to_string();
        assert!(config.validate().is_err());

        let mut config = InstallerConfig::default();
        config.cleanup.pattern = "it's.cfg".to_string();
        assert!(config.validate().is_err());
    }
}
