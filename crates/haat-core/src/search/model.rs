//! Search domain models.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Where a suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    /// Returned by the search/AI backend.
    Ai,
    /// A page phrase from the navigation table.
    Page,
}

/// A single entry of the suggestion dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionItem {
    pub text: String,
    pub source: SuggestionSource,
}

impl SuggestionItem {
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: SuggestionSource::Ai,
        }
    }

    pub fn page(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: SuggestionSource::Page,
        }
    }
}

/// Type tag of a search result.
///
/// Unknown tags are preserved verbatim so the result router can fall back to
/// a full-text search for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResultKind {
    Product,
    Vendor,
    Category,
    Brand,
    Other(String),
}

impl ResultKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Product => "product",
            Self::Vendor => "vendor",
            Self::Category => "category",
            Self::Brand => "brand",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for ResultKind {
    fn from(tag: String) -> Self {
        match tag.to_lowercase().as_str() {
            "product" => Self::Product,
            "vendor" => Self::Vendor,
            "category" => Self::Category,
            "brand" => Self::Brand,
            _ => Self::Other(tag),
        }
    }
}

impl From<ResultKind> for String {
    fn from(kind: ResultKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single search hit returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Opaque; numeric ids from the backend are kept as their decimal text.
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,

    #[serde(rename = "type")]
    pub kind: ResultKind,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Remaining domain fields (price, image, rating, ...), passed through
    /// to the renderer untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SearchResult {
    pub fn new(id: impl Into<String>, kind: ResultKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            category: None,
            brand: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

fn opaque_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// Intent metadata returned by the best-effort query analysis call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Alternative phrasings offered as extra suggestions.
    #[serde(default)]
    pub refinements: Vec<String>,
}

/// Language used for voice transcription.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VoiceLanguage {
    Bn,
    #[default]
    En,
}

impl VoiceLanguage {
    /// BCP-47 tag passed to speech services.
    pub fn locale(&self) -> &'static str {
        match self {
            Self::Bn => "bn-BD",
            Self::En => "en-US",
        }
    }
}

/// Channel through which the current query entered the system.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InputChannel {
    #[default]
    Text,
    Voice,
    Image,
    Qr,
}

/// A finished voice recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// A raw image file picked by the user (photo or QR code).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}
