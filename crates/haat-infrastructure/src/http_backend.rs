//! HTTP implementation of [`SearchBackend`].
//!
//! Every failure (connect error, timeout, non-2xx status, undecodable body)
//! is mapped to `HaatError::BackendUnavailable` tagged with the operation, so
//! the orchestrator can degrade uniformly.

use std::time::Duration;

use async_trait::async_trait;
use haat_core::config::BackendConfig;
use haat_core::error::{HaatError, Result};
use haat_core::search::{
    AudioBlob, Filters, ImageBlob, QueryAnalysis, SearchBackend, SearchResult, SuggestionItem,
    VoiceLanguage,
};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::dto::{
    ImageSearchRequest, QueryRequest, ResultsResponse, SearchRequest, SuggestionsResponse,
    VoiceSearchRequest,
};

#[derive(Clone)]
pub struct HttpSearchBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpSearchBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| HaatError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post<B, R>(&self, operation: &str, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let request = self.client.post(self.url(path)).json(body);
        self.send(operation, request).await
    }

    async fn get<R>(&self, operation: &str, path: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let request = self.client.get(self.url(path));
        self.send(operation, request).await
    }

    async fn send<R>(&self, operation: &str, mut request: RequestBuilder) -> Result<R>
    where
        R: DeserializeOwned,
    {
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() { "timed out" } else { "request failed" };
            HaatError::backend(operation, format!("{}: {}", reason, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(HaatError::backend(
                operation,
                format!("HTTP {}: {}", status, error_text.trim()),
            ));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| HaatError::backend(operation, format!("invalid response body: {}", e)))
    }
}

impl std::fmt::Debug for HttpSearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSearchBackend")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn fetch_suggestions(&self, text: &str) -> Result<Vec<SuggestionItem>> {
        let response: SuggestionsResponse = self
            .post("fetch_suggestions", "suggestions", &QueryRequest { query: text })
            .await?;
        Ok(response.into_items())
    }

    async fn analyze_query(&self, text: &str) -> Result<QueryAnalysis> {
        self.post("analyze_query", "analyze", &QueryRequest { query: text })
            .await
    }

    async fn search_with_text(&self, text: &str, filters: &Filters) -> Result<Vec<SearchResult>> {
        let body = SearchRequest {
            query: text,
            filters,
        };
        let response: ResultsResponse = self.post("search_with_text", "search", &body).await?;
        Ok(response.results)
    }

    async fn search_conversational(
        &self,
        text: &str,
        filters: &Filters,
    ) -> Result<Vec<SearchResult>> {
        let body = SearchRequest {
            query: text,
            filters,
        };
        let response: ResultsResponse = self
            .post("search_conversational", "search/conversational", &body)
            .await?;
        Ok(response.results)
    }

    async fn search_by_voice(
        &self,
        audio: &AudioBlob,
        language: VoiceLanguage,
    ) -> Result<Vec<SearchResult>> {
        let body = VoiceSearchRequest::new(audio, language);
        let response: ResultsResponse = self.post("search_by_voice", "search/voice", &body).await?;
        Ok(response.results)
    }

    async fn search_by_image(&self, image: &ImageBlob) -> Result<Vec<SearchResult>> {
        let body = ImageSearchRequest::new(image);
        let response: ResultsResponse = self.post("search_by_image", "search/image", &body).await?;
        Ok(response.results)
    }

    async fn get_personalized_recommendations(&self) -> Result<Vec<SearchResult>> {
        let response: ResultsResponse = self
            .get("get_personalized_recommendations", "recommendations")
            .await?;
        Ok(response.results)
    }
}
