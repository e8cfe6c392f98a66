use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_APPLICATION_ID, DEFAULT_BASE_URL};

/// Connection settings for the bot backend. Injected into the transport
/// at construction time; nothing else in the crate reads globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the bot backend
    pub base_url: String,
    /// Application (bot) identifier sent with every request
    pub application_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            application_id: DEFAULT_APPLICATION_ID.to_string(),
        }
    }
}

impl Config {
    pub fn new(base_url: impl Into<String>, application_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            application_id: application_id.into(),
        }
    }

    /// Build a config from environment overrides, falling back to the
    /// compiled defaults.
    pub fn from_env() -> Self {
        let base_url = std::env::var("SELKIE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let application_id = std::env::var("SELKIE_APPLICATION_ID")
            .unwrap_or_else(|_| DEFAULT_APPLICATION_ID.to_string());
        Self {
            base_url,
            application_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.application_id, DEFAULT_APPLICATION_ID);
    }

    #[test]
    fn test_explicit_config() {
        let config = Config::new("https://bots.example.com", "support-bot");
        assert_eq!(config.base_url, "https://bots.example.com");
        assert_eq!(config.application_id, "support-bot");
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("SELKIE_BASE_URL", "https://override.example.com");
        let config = Config::from_env();
        std::env::remove_var("SELKIE_BASE_URL");

        assert_eq!(config.base_url, "https://override.example.com");
        assert_eq!(config.application_id, DEFAULT_APPLICATION_ID);
    }
}
