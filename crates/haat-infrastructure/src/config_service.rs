//! Configuration service implementation.
//!
//! Loads the root configuration from `~/.config/haat/config.toml`, layers
//! `HAAT_*` environment overrides on top and caches the result.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use haat_core::config::RootConfig;
use haat_core::error::{HaatError, Result};
use haat_core::search::VoiceLanguage;

use crate::paths::HaatPaths;

pub const ENV_BACKEND_URL: &str = "HAAT_BACKEND_URL";
pub const ENV_API_KEY: &str = "HAAT_API_KEY";
pub const ENV_BACKEND_TIMEOUT_SECS: &str = "HAAT_BACKEND_TIMEOUT_SECS";
pub const ENV_VOICE_LANGUAGE: &str = "HAAT_VOICE_LANGUAGE";
pub const ENV_NAVIGATION_TABLE: &str = "HAAT_NAVIGATION_TABLE";

/// Loads and caches the root configuration.
///
/// A missing config file is created with defaults. A file that cannot be
/// parsed is reported and defaults are used instead, so a broken config never
/// keeps the search surface from starting.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: HaatPaths,
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    pub fn new(paths: HaatPaths) -> Self {
        Self {
            paths,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the root configuration, loading from file if not cached.
    pub fn get_config(&self) -> RootConfig {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref config) = *cached {
                return config.clone();
            }
        }

        let file_config = match self.load_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default configuration: {}", e);
                RootConfig::default()
            }
        };
        let config = apply_env_overrides(file_config, |key| std::env::var(key).ok());

        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(config.clone());
        config
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Navigation table path from the config, or the conventional file in
    /// the config directory when that exists.
    pub fn navigation_table_path(&self) -> Option<PathBuf> {
        if let Some(path) = self.get_config().navigation_table {
            return Some(path);
        }
        self.paths
            .navigation_file()
            .ok()
            .filter(|path| path.is_file())
    }

    fn load_config(&self) -> Result<RootConfig> {
        let path = self.paths.config_file()?;

        if !path.exists() {
            let config = RootConfig::default();
            if let Err(e) = save_config(&path, &config) {
                tracing::debug!(path = %path.display(), "Could not write default config: {}", e);
            }
            return Ok(config);
        }

        let content = std::fs::read_to_string(&path)?;
        let config: RootConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

fn save_config(path: &std::path::Path, config: &RootConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(config)?)?;
    Ok(())
}

/// Applies `HAAT_*` overrides. Unparseable values are ignored with a warning.
pub fn apply_env_overrides<F>(mut config: RootConfig, var: F) -> RootConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = var(ENV_BACKEND_URL) {
        config.backend.base_url = url;
    }
    if let Some(key) = var(ENV_API_KEY) {
        config.backend.api_key = Some(key);
    }
    if let Some(raw) = var(ENV_BACKEND_TIMEOUT_SECS) {
        match raw.parse() {
            Ok(secs) => config.backend.timeout_secs = secs,
            Err(_) => tracing::warn!("Ignoring {}={:?}: not a number", ENV_BACKEND_TIMEOUT_SECS, raw),
        }
    }
    if let Some(raw) = var(ENV_VOICE_LANGUAGE) {
        match raw.parse::<VoiceLanguage>() {
            Ok(language) => config.voice.default_language = language,
            Err(_) => tracing::warn!("Ignoring {}={:?}: expected bn or en", ENV_VOICE_LANGUAGE, raw),
        }
    }
    if let Some(path) = var(ENV_NAVIGATION_TABLE) {
        config.navigation_table = Some(PathBuf::from(path));
    }
    config
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new(HaatPaths::default())
    }
}

/// Validates the settings the backend client depends on.
pub fn validate(config: &RootConfig) -> Result<()> {
    if config.backend.base_url.trim().is_empty() {
        return Err(HaatError::config("backend.base_url must not be empty"));
    }
    if config.backend.timeout_secs == 0 {
        return Err(HaatError::config("backend.timeout_secs must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_replace_file_values() {
        let config = apply_env_overrides(
            RootConfig::default(),
            env(&[
                (ENV_BACKEND_URL, "https://search.example.com/api"),
                (ENV_API_KEY, "k-123"),
                (ENV_BACKEND_TIMEOUT_SECS, "5"),
                (ENV_VOICE_LANGUAGE, "BN"),
                (ENV_NAVIGATION_TABLE, "/etc/haat/pages.toml"),
            ]),
        );

        assert_eq!(config.backend.base_url, "https://search.example.com/api");
        assert_eq!(config.backend.api_key.as_deref(), Some("k-123"));
        assert_eq!(config.backend.timeout_secs, 5);
        assert_eq!(config.voice.default_language, VoiceLanguage::Bn);
        assert_eq!(
            config.navigation_table,
            Some(PathBuf::from("/etc/haat/pages.toml"))
        );
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let config = apply_env_overrides(
            RootConfig::default(),
            env(&[(ENV_BACKEND_TIMEOUT_SECS, "soon"), (ENV_VOICE_LANGUAGE, "fr")]),
        );
        assert_eq!(config, RootConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = RootConfig::default();
        config.backend.timeout_secs = 0;
        assert!(validate(&config).unwrap_err().is_config());
        assert!(validate(&RootConfig::default()).is_ok());
    }
}
