//! Configuration types and utilities for Lexaid
//!
//! Precedence, lowest first: built-in defaults, an optional TOML file,
//! environment variables. Binaries apply their CLI flags on top.

use crate::constants::{self, env, models};
use crate::error::Result;
use crate::types::{ApiKey, Language};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Provider configuration for the inference service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Model to use for every operation
    pub model: String,
    /// Sampling temperature for free-form answers
    pub temperature: f64,
    /// Pause before retrying on the next key (ms)
    pub rotation_delay_ms: u64,
    /// Keys listed in the config file; environment keys are appended
    pub api_keys: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: models::GEMINI_2_FLASH.to_string(),
            temperature: constants::DEFAULT_TEMPERATURE,
            rotation_delay_ms: constants::DEFAULT_ROTATION_DELAY_MS,
            api_keys: Vec::new(),
        }
    }
}

/// Top level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexConfig {
    pub provider: ProviderConfig,
    /// Response language used when a command does not pass one
    pub default_language: Language,
}

impl LexConfig {
    /// Load defaults, then the file at `path` if it exists, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                info!("Loading configuration from {:?}", path);
                let raw = std::fs::read_to_string(path)?;
                Self::from_toml_str(&raw)?
            }
            Some(path) => {
                debug!("Config file {:?} not found, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Overlay values from an environment lookup
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(list) = lookup(env::API_KEYS) {
            self.provider
                .api_keys
                .extend(list.split(',').map(|k| k.trim().to_string()));
        }

        if let Some(key) = lookup(env::GEMINI_API_KEY) {
            self.provider.api_keys.push(key);
        }
        for n in 2..=env::MAX_NUMBERED_KEYS {
            if let Some(key) = lookup(&format!("{}_{}", env::GEMINI_API_KEY, n)) {
                self.provider.api_keys.push(key);
            }
        }

        if let Some(model) = lookup(env::MODEL).filter(|m| !m.trim().is_empty()) {
            self.provider.model = model.trim().to_string();
        }
        if let Some(lang) = lookup(env::LANGUAGE).filter(|l| !l.trim().is_empty()) {
            self.default_language = Language::new(lang);
        }
    }

    /// The ordered, de-duplicated key list. Blank entries are dropped and
    /// the first occurrence of a repeated key keeps its position.
    pub fn credentials(&self) -> Vec<ApiKey> {
        let mut keys: Vec<ApiKey> = Vec::new();
        for raw in &self.provider.api_keys {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let key = ApiKey::new(trimmed);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LexConfig::default();
        assert_eq!(config.provider.model, models::GEMINI_2_FLASH);
        assert_eq!(config.provider.rotation_delay_ms, 300);
        assert!(config.default_language.is_default());
        assert!(config.credentials().is_empty());
    }

    #[test]
    fn test_env_keys_are_ordered_and_deduplicated() {
        let mut config = LexConfig::default();
        config.apply_env_with(lookup(&[
            ("LEXAID_API_KEYS", "k1, k2,,k1"),
            ("GEMINI_API_KEY", "k3"),
            ("GEMINI_API_KEY_2", "k2"),
            ("GEMINI_API_KEY_3", "k4"),
        ]));

        let keys: Vec<String> = config
            .credentials()
            .iter()
            .map(|k| k.expose().to_string())
            .collect();
        assert_eq!(keys, vec!["k1", "k2", "k3", "k4"]);
    }

    #[test]
    fn test_file_then_env_precedence() {
        let mut config = LexConfig::from_toml_str(
            r#"
            default_language = "hi"

            [provider]
            model = "gemini-2.5-pro"
            api_keys = ["file-key"]
            "#,
        )
        .unwrap();
        config.apply_env_with(lookup(&[("LEXAID_MODEL", "gemini-2.5-flash"), ("GEMINI_API_KEY", "env-key")]));

        assert_eq!(config.provider.model, "gemini-2.5-flash");
        assert_eq!(config.default_language.code(), "hi");
        assert_eq!(config.credentials().len(), 2);
        assert_eq!(config.credentials()[0].expose(), "file-key");
    }

    #[test]
    fn test_load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexaid.toml");
        std::fs::write(&path, "[provider]\nrotation_delay_ms = 50\n").unwrap();

        let config = LexConfig::load(Some(&path)).unwrap();
        assert_eq!(config.provider.rotation_delay_ms, 50);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(LexConfig::from_toml_str("provider = 3").is_err());
    }
}
