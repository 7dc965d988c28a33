//! Wire types of the search/AI HTTP API.
//!
//! Request bodies are camelCase JSON; binary uploads travel as standard
//! base64 strings.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use haat_core::search::{
    AudioBlob, Filters, ImageBlob, SearchResult, SuggestionItem, SuggestionSource, VoiceLanguage,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "no_filters")]
    pub filters: &'a Filters,
}

fn no_filters(filters: &&Filters) -> bool {
    filters.is_empty()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSearchRequest {
    /// Base64 of the recorded container.
    pub audio: String,
    pub mime_type: String,
    /// BCP-47 locale, e.g. `bn-BD`.
    pub language: &'static str,
}

impl VoiceSearchRequest {
    pub fn new(audio: &AudioBlob, language: VoiceLanguage) -> Self {
        Self {
            audio: STANDARD.encode(&audio.bytes),
            mime_type: audio.mime_type.clone(),
            language: language.locale(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSearchRequest {
    pub image: String,
    pub mime_type: String,
    pub file_name: String,
}

impl ImageSearchRequest {
    pub fn new(image: &ImageBlob) -> Self {
        Self {
            image: STANDARD.encode(&image.bytes),
            mime_type: image.mime_type.clone(),
            file_name: image.file_name.clone(),
        }
    }
}

/// A suggestion as the API returns it: a bare string or a full item.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SuggestionDto {
    Text(String),
    Item {
        text: String,
        #[serde(default)]
        source: Option<SuggestionSource>,
    },
}

impl From<SuggestionDto> for SuggestionItem {
    fn from(dto: SuggestionDto) -> Self {
        match dto {
            SuggestionDto::Text(text) => SuggestionItem::ai(text),
            SuggestionDto::Item { text, source } => SuggestionItem {
                text,
                source: source.unwrap_or(SuggestionSource::Ai),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsResponse {
    #[serde(default)]
    pub suggestions: Vec<SuggestionDto>,
}

impl SuggestionsResponse {
    /// Blank suggestions are dropped.
    pub fn into_items(self) -> Vec<SuggestionItem> {
        self.suggestions
            .into_iter()
            .map(SuggestionItem::from)
            .filter(|item| !item.text.trim().is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct ResultsResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}
