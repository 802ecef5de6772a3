//! Shell configuration

use crate::error::{ChatwaveError, ChatwaveResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the persisted user settings inside the config directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Persisted user preferences.
///
/// The bridge only reads these; the preferences window that writes them is
/// a separate collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Enable spell checking in text inputs
    pub spell_check_enabled: bool,

    /// Spell check locale, empty means "follow the system locale"
    pub spell_check_locale: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            spell_check_enabled: false,
            spell_check_locale: String::new(),
        }
    }
}

impl UserConfig {
    /// Default location of the settings file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatwave")
            .join(SETTINGS_FILE)
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> ChatwaveResult<Self> {
        if !path.exists() {
            log::debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            ChatwaveError::config(format!("invalid settings file {}: {}", path.display(), e))
        })
    }

    /// Persist settings to `path`, creating parent directories as needed
    pub fn save(&self, path: &Path) -> ChatwaveResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Locale the spell checker should use
    pub fn effective_spell_check_locale(&self, system_locale: &str) -> String {
        if self.spell_check_locale.trim().is_empty() {
            system_locale.to_string()
        } else {
            self.spell_check_locale.clone()
        }
    }
}

/// Runtime settings of the command bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Document title shown by the page when there is nothing unread
    pub idle_title: String,

    /// Delay between content load and the settings warm-up, in milliseconds
    pub warmup_delay_ms: u64,

    /// Upper bound on a single icon fetch, in seconds
    pub icon_timeout_secs: u64,

    /// Class added to the page root when the previous markup generation is detected
    pub legacy_style_class: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            idle_title: "Messenger".to_string(),
            warmup_delay_ms: 1000,
            icon_timeout_secs: 30,
            legacy_style_class: "chatwave-legacy".to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn warmup_delay(&self) -> Duration {
        Duration::from_millis(self.warmup_delay_ms)
    }

    pub fn icon_timeout(&self) -> Duration {
        Duration::from_secs(self.icon_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = UserConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, UserConfig::default());
        assert!(!config.spell_check_enabled);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        let config = UserConfig {
            spell_check_enabled: true,
            spell_check_locale: "fr-FR".to_string(),
        };
        config.save(&path).unwrap();

        assert_eq!(UserConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{"spell_check_enabled": true}"#).unwrap();

        let config = UserConfig::load(&path).unwrap();
        assert!(config.spell_check_enabled);
        assert_eq!(config.spell_check_locale, "");
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            UserConfig::load(&path),
            Err(ChatwaveError::Config(_))
        ));
    }

    #[test]
    fn test_effective_locale() {
        let mut config = UserConfig::default();
        assert_eq!(config.effective_spell_check_locale("en-US"), "en-US");

        config.spell_check_locale = "de-DE".to_string();
        assert_eq!(config.effective_spell_check_locale("en-US"), "de-DE");
    }

    #[test]
    fn test_bridge_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.idle_title, "Messenger");
        assert_eq!(config.warmup_delay(), Duration::from_millis(1000));
        assert_eq!(config.icon_timeout(), Duration::from_secs(30));
    }
}
