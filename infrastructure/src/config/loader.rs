//! Configuration loader with multi-source merging

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the agent server. When unset, the built-in in-memory
    /// backend is used.
    pub url: Option<String>,
    /// Timeout in seconds for non-streaming API calls
    pub request_timeout_seconds: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            request_timeout_seconds: Some(30),
        }
    }
}

/// REPL-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// Show the spinner while waiting for the first token
    pub show_progress: bool,
    /// Path to history file
    pub history_file: Option<String>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write the conversation transcript to this JSONL file
    pub transcript_file: Option<String>,
    /// Write tracing output to a file instead of stderr
    pub log_file: Option<String>,
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend settings
    pub backend: BackendConfig,
    /// REPL settings
    pub repl: ReplConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Configuration loader that merges multiple sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./parley.toml` or `./.parley.toml`
    /// 3. XDG config: `$XDG_CONFIG_HOME/parley/config.toml`
    /// 4. Fallback: `~/.config/parley/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<AppConfig, figment::Error> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        // Add global config (XDG or fallback)
        if let Some(global_path) = Self::global_config_path() {
            figment = figment.merge(Toml::file(&global_path));
        }

        // Add project-level config files (check both names)
        figment = figment
            .merge(Toml::file(".parley.toml"))
            .merge(Toml::file("parley.toml"));

        // Explicit config path wins over everything
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.extract()
    }

    /// Location of the global config file, if a config directory exists.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("parley").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Toml as TomlProvider;

    #[test]
    fn defaults_use_in_memory_backend() {
        let config = AppConfig::default();
        assert!(config.backend.url.is_none());
        assert_eq!(config.backend.request_timeout_seconds, Some(30));
        assert!(config.repl.show_progress);
        assert!(config.logging.transcript_file.is_none());
    }

    #[test]
    fn toml_overrides_defaults() {
        let figment = Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(TomlProvider::string(
                r#"
                [backend]
                url = "http://localhost:8787"

                [repl]
                show_progress = false
                "#,
            ));
        let config: AppConfig = figment.extract().unwrap();
        assert_eq!(config.backend.url.as_deref(), Some("http://localhost:8787"));
        assert!(!config.repl.show_progress);
        // Untouched sections keep their defaults
        assert_eq!(config.backend.request_timeout_seconds, Some(30));
    }

    #[test]
    fn partial_sections_merge() {
        let figment = Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(TomlProvider::string(
                r#"
                [logging]
                transcript_file = "chat.jsonl"
                "#,
            ));
        let config: AppConfig = figment.extract().unwrap();
        assert_eq!(config.logging.transcript_file.as_deref(), Some("chat.jsonl"));
        assert!(config.backend.url.is_none());
    }
}
