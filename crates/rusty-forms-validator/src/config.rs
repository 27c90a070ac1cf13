// File: src/config.rs
// Purpose: Validator configuration parsed from TOML

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::messages::MessageCatalog;

/// Validator configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidatorConfig {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    /// Message key -> template overrides
    #[serde(default)]
    pub messages: HashMap<String, String>,
}

/// Client-side validation engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Whether client markers are applied by default
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Language the client engine is localized to
    #[serde(default = "default_language")]
    pub language: String,

    /// Request jQuery along with the client engine
    #[serde(default = "default_true")]
    pub include_jquery: bool,
}

/// Remote constraint transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Base used to absolutize relative endpoints (e.g. "https://example.com")
    #[serde(default)]
    pub base_url: Option<String>,
}

// Default values
fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "en".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    2000
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_user_agent() -> String {
    "rusty-forms-validator".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: default_language(),
            include_jquery: true,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            base_url: None,
        }
    }
}

impl RemoteConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ValidatorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read validator config: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse validator config: {:?}", path))
    }

    /// Parse configuration from a TOML string. Blank input yields defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: ValidatorConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Message catalog built from the `[messages]` table
    pub fn message_catalog(&self) -> MessageCatalog {
        MessageCatalog::from_map(self.messages.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Translator;

    #[test]
    fn test_default_config() {
        let config = ValidatorConfig::default();
        assert!(config.client.enabled);
        assert_eq!(config.client.language, "en");
        assert_eq!(config.remote.connect_timeout(), Duration::from_secs(2));
        assert!(config.remote.base_url.is_none());
    }

    #[test]
    fn test_empty_config() {
        let config = ValidatorConfig::from_toml_str("").unwrap();
        assert!(config.client.include_jquery);
        assert_eq!(config.remote.timeout_ms, 5000);
    }

    #[test]
    fn test_custom_sections() {
        let toml = r#"
            [client]
            enabled = false
            language = "de"

            [remote]
            connect_timeout_ms = 500
            base_url = "https://example.com"

            [messages]
            "validator.required" = "Pflichtfeld"
        "#;
        let config = ValidatorConfig::from_toml_str(toml).unwrap();
        assert!(!config.client.enabled);
        assert_eq!(config.client.language, "de");
        assert_eq!(config.remote.connect_timeout_ms, 500);
        assert_eq!(config.remote.base_url.as_deref(), Some("https://example.com"));
        assert_eq!(
            config.message_catalog().translate("validator.required", "x", &[]),
            "Pflichtfeld"
        );
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = ValidatorConfig::load("/definitely/not/here/validator.toml").unwrap();
        assert!(config.client.enabled);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(ValidatorConfig::from_toml_str("[client\nenabled = ").is_err());
    }
}
