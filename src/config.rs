//! Common layer configuration.
//!
//! Defaults are persisted to a per-user config file. Environment variables
//! override any stored values so managed hosts can force a debug level.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::error::{EngineError, EngineResult};

/// Debug level used when nothing is configured: warnings only.
pub const DEFAULT_DEBUG_LEVEL: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IclConfig {
    /// 0 silences the layer, 1 logs warnings, 2 and above adds debug messages.
    #[serde(default = "default_debug")]
    pub debug: u8,
    /// Directory for rolling log files; logs go to stderr when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_debug() -> u8 {
    DEFAULT_DEBUG_LEVEL
}

fn config_path() -> PathBuf {
    if cfg!(windows) {
        let appdata = std::env::var_os("APPDATA")
            .unwrap_or_else(|| std::env::var_os("USERPROFILE").unwrap_or_default());
        let mut path = PathBuf::from(appdata);
        path.push("ICL");
        path.push("config.json");
        path
    } else {
        let home = std::env::var_os("HOME").unwrap_or_default();
        let mut path = PathBuf::from(home);
        path.push(".icl");
        path.push("config.json");
        path
    }
}

fn load_from_file(path: &Path) -> Option<IclConfig> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

impl IclConfig {
    fn defaults() -> Self {
        Self {
            debug: DEFAULT_DEBUG_LEVEL,
            log_dir: None,
        }
    }

    /// Applies `ICL_DEBUG` and `ICL_LOG_DIR` as returned by `lookup`.
    ///
    /// Unparsable or empty values leave the stored setting alone.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("ICL_DEBUG").and_then(|v| v.trim().parse().ok()) {
            self.debug = value;
        }
        if let Some(value) = lookup("ICL_LOG_DIR") {
            let value = value.trim();
            if !value.is_empty() {
                self.log_dir = Some(PathBuf::from(value));
            }
        }
    }

    /// Loads the per-user config file with environment overrides applied
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Loads `path`, falling back to defaults when it is missing or malformed
    pub fn load_from(path: &Path) -> Self {
        let mut config = load_from_file(path).unwrap_or_else(Self::defaults);
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn save_to_file(&self) -> EngineResult<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> EngineResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::internal(format!("Failed to create config directory: {}", e))
            })?;
        }

        let payload = serde_json::to_string_pretty(self)
            .map_err(|e| EngineError::internal(format!("Save failed: {}", e)))?;
        fs::write(path, payload)
            .map_err(|e| EngineError::internal(format!("Save failed: {}", e)))?;
        Ok(())
    }

    /// Default `tracing` filter directive for the configured debug level
    pub fn filter_directive(&self) -> &'static str {
        match self.debug {
            0 => "icl_lib=error",
            1 => "icl_lib=warn",
            _ => "icl_lib=debug",
        }
    }
}

impl Default for IclConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use uuid::Uuid;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("icl-config-{}", Uuid::new_v4()))
            .join("config.json")
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn env_overrides_replace_stored_values() {
        let vars = env(&[("ICL_DEBUG", " 2 "), ("ICL_LOG_DIR", "/var/log/icl")]);
        let mut config = IclConfig::default();
        config.apply_overrides(|key| vars.get(key).cloned());

        assert_eq!(config.debug, 2);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/icl")));
    }

    #[test]
    fn bad_or_empty_env_values_are_ignored() {
        let vars = env(&[("ICL_DEBUG", "loud"), ("ICL_LOG_DIR", "  ")]);
        let mut config = IclConfig {
            debug: 0,
            log_dir: Some(PathBuf::from("/srv/icl")),
        };
        config.apply_overrides(|key| vars.get(key).cloned());

        assert_eq!(config.debug, 0);
        assert_eq!(config.log_dir, Some(PathBuf::from("/srv/icl")));

        let vars = env(&[("ICL_DEBUG", "300")]);
        config.apply_overrides(|key| vars.get(key).cloned());
        assert_eq!(config.debug, 0);
    }

    #[test]
    fn missing_or_malformed_file_loads_defaults() {
        let path = scratch_path();
        let mut expected = IclConfig::default();
        expected.apply_overrides(|key| std::env::var(key).ok());

        assert_eq!(IclConfig::load_from(&path), expected);

        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(&path, "{ not json").expect("write");
        assert_eq!(IclConfig::load_from(&path), expected);

        fs::remove_dir_all(path.parent().unwrap()).expect("cleanup");
    }

    #[test]
    fn saved_config_loads_back() {
        let path = scratch_path();
        let config = IclConfig {
            debug: 3,
            log_dir: Some(PathBuf::from("/var/log/icl")),
        };
        config.save_to(&path).expect("save");

        let mut expected = config.clone();
        expected.apply_overrides(|key| std::env::var(key).ok());
        assert_eq!(IclConfig::load_from(&path), expected);

        fs::remove_dir_all(path.parent().unwrap()).expect("cleanup");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: IclConfig = serde_json::from_str("{}").expect("should parse");
        assert_eq!(config, IclConfig::default());
        assert_eq!(config.debug, DEFAULT_DEBUG_LEVEL);
    }

    #[test]
    fn debug_level_selects_filter() {
        let mut config = IclConfig::default();
        assert_eq!(config.filter_directive(), "icl_lib=warn");

        config.debug = 0;
        assert_eq!(config.filter_directive(), "icl_lib=error");

        config.debug = 2;
        assert_eq!(config.filter_directive(), "icl_lib=debug");
        config.debug = 9;
        assert_eq!(config.filter_directive(), "icl_lib=debug");
    }

    #[test]
    fn log_dir_round_trips_through_json() {
        let config = IclConfig {
            debug: 2,
            log_dir: Some(PathBuf::from("/var/log/icl")),
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed: IclConfig = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, config);
    }
}
