//! Configuration model for the search core.
//!
//! The on-disk representation lives in `~/.config/haat/config.toml`; loading and
//! environment overrides are handled by the infrastructure layer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::search::VoiceLanguage;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8080/api";

/// Root configuration.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct RootConfig {
    /// Terms shown in the "trending" strip before the user types anything.
    pub trending_terms: Vec<String>,
    /// Optional TOML file holding the page navigation table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation_table: Option<PathBuf>,
    pub backend: BackendConfig,
    pub suggestions: SuggestionConfig,
    pub voice: VoiceConfig,
}

/// Connection settings for the search/AI backend.
///
/// The backend client owns request timeouts; the orchestrator never imposes
/// one of its own.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Upper bound on page suggestions per keystroke.
    pub max_page_suggestions: usize,
    /// Query analysis only runs for queries longer than this many characters.
    pub analysis_min_chars: usize,
    /// Upper bound on AI suggestions kept from one backend response.
    pub max_ai_suggestions: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_page_suggestions: 5,
            analysis_min_chars: 3,
            max_ai_suggestions: 8,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VoiceConfig {
    pub default_language: VoiceLanguage,
    /// Amplitude meter sampling period (one animation frame by default).
    pub meter_interval_ms: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            default_language: VoiceLanguage::En,
            meter_interval_ms: 16,
        }
    }
}
