//! TOML-based configuration.
//!
//! Stores:
//! - The interaction timeout (`0` disables the timeout path)
//! - The countdown tick cadence
//! - The host frame cadence used by the page host and the CLI
//!
//! Configuration is stored at `~/.config/defer-interaction/config.toml`.
//! Set `DEFER_INTERACTION_ENV=dev` to use `~/.config/defer-interaction-dev/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default interaction timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default countdown cadence in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 1_000;
/// Default frame cadence (~60 fps) in milliseconds.
pub const DEFAULT_FRAME_MS: u64 = 16;

/// Per-provider settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Milliseconds before the gate opens on its own. `0` disables it.
    pub timeout_ms: u64,
    pub tick_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

impl ProviderConfig {
    pub fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            ..Self::default()
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}
fn default_frame_ms() -> u64 {
    DEFAULT_FRAME_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            tick_ms: DEFAULT_TICK_MS,
            frame_ms: DEFAULT_FRAME_MS,
        }
    }
}

impl Config {
    /// Returns `~/.config/defer-interaction[-dev]/`.
    pub fn dir() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .ok_or(ConfigError::NoConfigDir)?;
        let env = std::env::var("DEFER_INTERACTION_ENV").unwrap_or_default();
        let name = if env == "dev" {
            "defer-interaction-dev"
        } else {
            "defer-interaction"
        };
        Ok(base.join(name))
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(Self::dir()?.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&content)?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tick_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.frame_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "frame_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub fn provider(&self) -> ProviderConfig {
        ProviderConfig {
            timeout_ms: self.timeout_ms,
            tick_ms: self.tick_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_keys_take_defaults() {
        let config = Config::from_toml("timeout_ms = 3000\n").unwrap();
        assert_eq!(config.timeout_ms, 3_000);
        assert_eq!(config.tick_ms, DEFAULT_TICK_MS);
        assert_eq!(config.frame_ms, DEFAULT_FRAME_MS);
    }

    #[test]
    fn zero_timeout_is_valid() {
        let config = Config::from_toml("timeout_ms = 0").unwrap();
        assert_eq!(config.provider().timeout_ms, 0);
    }

    #[test]
    fn zero_tick_is_rejected() {
        let err = Config::from_toml("tick_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "tick_ms"));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = Config::from_toml("timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed(_)));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            timeout_ms: 4_500,
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { path: p, .. } if p == path));
    }
}
