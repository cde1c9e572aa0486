use crate::dates::DisplayZone;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_WINDOW_SIZE: usize = 250;
pub const DEFAULT_RENDER_THRESHOLD: usize = 50;

/// Validated settings the view runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Maximum number of messages materialized at once
    pub window_size: usize,
    /// Distance from a window edge at which the window is recomputed
    pub render_threshold: usize,
    /// Merge consecutive same-recipient messages under one header
    pub collapse_messages: bool,
    pub zone: DisplayZone,
    pub twenty_four_hour_time: bool,
    pub hide_muted_senders: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            render_threshold: DEFAULT_RENDER_THRESHOLD,
            collapse_messages: true,
            zone: DisplayZone::UTC,
            twenty_four_hour_time: false,
            hide_muted_senders: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::Configuration(
                "window_size must be greater than zero".to_string(),
            ));
        }
        if self.render_threshold >= self.window_size {
            return Err(Error::Configuration(format!(
                "render_threshold ({}) must be smaller than window_size ({})",
                self.render_threshold, self.window_size
            )));
        }
        Ok(())
    }
}

/// User-editable preferences, persisted as TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewPreferences {
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_render_threshold")]
    pub render_threshold: usize,
    #[serde(default = "default_true")]
    pub collapse_messages: bool,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default)]
    pub twenty_four_hour_time: bool,
    #[serde(default = "default_true")]
    pub hide_muted_senders: bool,
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_render_threshold() -> usize {
    DEFAULT_RENDER_THRESHOLD
}

fn default_true() -> bool {
    true
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

impl Default for ViewPreferences {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            render_threshold: default_render_threshold(),
            collapse_messages: true,
            time_zone: default_time_zone(),
            twenty_four_hour_time: false,
            hide_muted_senders: true,
        }
    }
}

impl ViewPreferences {
    /// Get the path to the preferences file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            Error::Configuration("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("scrollback").join("preferences.toml"))
    }

    /// Load preferences from disk, or return defaults if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        match toml::from_str(&contents) {
            Ok(prefs) => Ok(prefs),
            Err(e) => {
                tracing::warn!(
                    target: "scrollback.config",
                    "Failed to parse preferences file at {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        let config = EngineConfig {
            window_size: self.window_size,
            render_threshold: self.render_threshold,
            collapse_messages: self.collapse_messages,
            zone: self.time_zone.parse()?,
            twenty_four_hour_time: self.twenty_four_hour_time,
            hide_muted_senders: self.hide_muted_senders,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let prefs = ViewPreferences::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(prefs, ViewPreferences::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "time_zone = \"Europe/Berlin\"\nwindow_size = 400\n").unwrap();

        let prefs = ViewPreferences::load_from(&path).unwrap();
        assert_eq!(prefs.window_size, 400);
        assert_eq!(prefs.render_threshold, DEFAULT_RENDER_THRESHOLD);
        assert!(prefs.collapse_messages);

        let config = prefs.engine_config().unwrap();
        assert_eq!(config.zone.to_string(), "Europe/Berlin");
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "window_size = \"lots\"").unwrap();
        assert_eq!(
            ViewPreferences::load_from(&path).unwrap(),
            ViewPreferences::default()
        );
    }

    #[test]
    fn test_save_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("preferences.toml");
        let prefs = ViewPreferences {
            twenty_four_hour_time: true,
            ..Default::default()
        };
        prefs.save_to(&path).unwrap();
        assert_eq!(ViewPreferences::load_from(&path).unwrap(), prefs);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let prefs = ViewPreferences {
            render_threshold: 300,
            ..Default::default()
        };
        assert!(matches!(prefs.engine_config(), Err(Error::Configuration(_))));

        let prefs = ViewPreferences {
            time_zone: "Nowhere/Special".to_string(),
            ..Default::default()
        };
        assert!(matches!(prefs.engine_config(), Err(Error::TimeZone(_))));
    }
}
