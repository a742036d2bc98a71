//! Configuration management for askai.
//!
//! Defaults can be stored in `~/.config/askai/config.toml`. The server address
//! comes from `LLM_API_BASEURL` when set.

use crate::protocol::{Sampling, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_P};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the server base URL.
pub const BASE_URL_ENV: &str = "LLM_API_BASEURL";

/// Server used when neither the environment nor the config file name one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Base URL of the inference server.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request defaults.
    #[serde(default)]
    pub request: RequestDefaults,
}

/// Defaults applied to every request unless overridden on the command line.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestDefaults {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    /// System prompt used when `--instruction` is not given.
    #[serde(default)]
    pub instruction: Option<String>,
    /// Instruction template used when `--template` is not given.
    #[serde(default)]
    pub template: Option<String>,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            instruction: None,
            template: None,
        }
    }
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_top_p() -> f64 {
    DEFAULT_TOP_P
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("askai"))
            .context("Could not determine config directory")
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location, using defaults if not found.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            // No home directory: nothing to load
            Err(_) => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`, using defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the server base URL from an optional environment value.
    pub fn base_url_with(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|v| !v.is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Resolve the server base URL, consulting `LLM_API_BASEURL`.
    pub fn base_url(&self) -> String {
        self.base_url_with(std::env::var(BASE_URL_ENV).ok())
    }

    /// Sampling parameters from the config file.
    pub fn sampling(&self) -> Sampling {
        Sampling {
            max_tokens: self.request.max_tokens,
            temperature: self.request.temperature,
            top_p: self.request.top_p,
        }
    }
}

/// Full completion endpoint for a base URL.
pub fn endpoint_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), COMPLETIONS_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.base_url.is_none());
        assert_eq!(config.sampling(), Sampling::default());
    }

    #[test]
    fn test_base_url_precedence() {
        let mut config = Config::default();
        assert_eq!(config.base_url_with(None), "http://localhost:5000");

        config.base_url = Some("http://gpu-box:8080".to_string());
        assert_eq!(config.base_url_with(None), "http://gpu-box:8080");
        assert_eq!(
            config.base_url_with(Some("http://127.0.0.1:5001".to_string())),
            "http://127.0.0.1:5001"
        );
        assert_eq!(config.base_url_with(Some(String::new())), "http://gpu-box:8080");
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("http://localhost:5000"),
            "http://localhost:5000/v1/chat/completions"
        );
        assert_eq!(
            endpoint_url("http://localhost:5000/"),
            "http://localhost:5000/v1/chat/completions"
        );
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
base_url = "http://llm.lan:5000"

[request]
max_tokens = 512
temperature = 0.2
instruction = "You are terse."
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://llm.lan:5000"));
        assert_eq!(config.request.max_tokens, 512);
        assert_eq!(config.request.temperature, 0.2);
        assert_eq!(config.request.top_p, 0.9);
        assert_eq!(config.request.instruction.as_deref(), Some("You are terse."));
        assert!(config.request.template.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.request.max_tokens, 4096);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "request = 3").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
