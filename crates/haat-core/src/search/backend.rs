//! Search/AI backend trait definition.

use async_trait::async_trait;

use crate::error::Result;
use crate::search::{
    AudioBlob, Filters, ImageBlob, QueryAnalysis, SearchResult, SuggestionItem, VoiceLanguage,
};

/// The suggestion, analysis and search service the orchestrator consumes.
///
/// Every method may fail with [`HaatError::BackendUnavailable`]; callers
/// degrade instead of propagating. Implementations own their timeouts.
///
/// [`HaatError::BackendUnavailable`]: crate::error::HaatError::BackendUnavailable
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Search-as-you-type suggestions for partial text.
    async fn fetch_suggestions(&self, text: &str) -> Result<Vec<SuggestionItem>>;

    /// Best-effort intent analysis of a partial query.
    async fn analyze_query(&self, text: &str) -> Result<QueryAnalysis>;

    /// Literal keyword search.
    async fn search_with_text(&self, text: &str, filters: &Filters) -> Result<Vec<SearchResult>>;

    /// Natural-language search ("show me phones under 3000").
    async fn search_conversational(
        &self,
        text: &str,
        filters: &Filters,
    ) -> Result<Vec<SearchResult>>;

    /// Transcribes the recording and searches for what was said.
    async fn search_by_voice(
        &self,
        audio: &AudioBlob,
        language: VoiceLanguage,
    ) -> Result<Vec<SearchResult>>;

    /// Visual similarity search; QR images are decoded by the same endpoint.
    async fn search_by_image(&self, image: &ImageBlob) -> Result<Vec<SearchResult>>;

    /// Recommendations for the current user, fetched once at mount.
    async fn get_personalized_recommendations(&self) -> Result<Vec<SearchResult>>;
}
