//! The search orchestrator.
//!
//! One `SearchOrchestrator` exists per mounted search surface. It owns the
//! [`SearchSession`], runs the search-as-you-type pipeline, dispatches
//! submitted queries to the right backend entry point, and drives the
//! visibility state machine.
//!
//! Every asynchronous completion carries the [`RequestToken`] it was issued
//! under and is applied only while that token is still the session's active
//! one. In-flight requests are never cancelled at the transport level; late
//! completions are simply dropped.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use haat_core::capture::{AudioCapture, Transcriber};
use haat_core::config::RootConfig;
use haat_core::error::{HaatError, Result};
use haat_core::intent::{self, QueryIntent};
use haat_core::navigation::{NavigationTable, NavigationTarget, Navigator, PageIntentResolver};
use haat_core::router::route_result;
use haat_core::search::{
    AudioBlob, Filters, ImageBlob, InputChannel, QueryAnalysis, SearchBackend, SearchResult,
    SuggestionItem, VoiceLanguage,
};
use haat_core::session::{RequestToken, RequestTokens, SearchSession};
use haat_core::visibility::{PointerEvent, UiEvent};

use crate::listeners::{DocumentListeners, ListenerHandle};
use crate::lock;
use crate::picker::PickerKind;
use crate::state::{RecordingFeed, SearchState, SearchView};
use crate::voice::VoiceRecorder;

/// Collaborators injected at mount time.
#[derive(Clone)]
pub struct SearchDeps {
    pub backend: Arc<dyn SearchBackend>,
    pub navigator: Arc<dyn Navigator>,
    pub audio: Arc<dyn AudioCapture>,
    pub transcriber: Option<Arc<dyn Transcriber>>,
    pub table: Arc<NavigationTable>,
    pub config: RootConfig,
}

/// What a submission ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing to do (empty query or no recording).
    Ignored,
    /// Navigated to the given path without searching.
    Navigated(String),
    /// Results were shown.
    Results(usize),
    /// The backend failed; an empty result set with an error is shown.
    Failed(String),
    /// A newer request replaced this one before it completed.
    Superseded,
}

/// Events emitted by the result renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererEvent {
    SuggestionClick(SuggestionItem),
    ResultClick(SearchResult),
    TrendingClick(String),
    FiltersApply(Filters),
}

/// A dispatchable search request.
enum SearchRequest<'a> {
    Keyword(&'a str),
    Conversational(&'a str),
    Voice(AudioBlob),
    Image(ImageBlob, PickerKind),
}

impl SearchRequest<'_> {
    fn channel(&self) -> InputChannel {
        match self {
            Self::Keyword(_) | Self::Conversational(_) => InputChannel::Text,
            Self::Voice(_) => InputChannel::Voice,
            Self::Image(_, kind) => kind.channel(),
        }
    }

    fn operation(&self) -> &'static str {
        match self {
            Self::Keyword(_) => "search_with_text",
            Self::Conversational(_) => "search_conversational",
            Self::Voice(_) => "search_by_voice",
            Self::Image(..) => "search_by_image",
        }
    }
}

pub struct SearchOrchestrator {
    backend: Arc<dyn SearchBackend>,
    navigator: Arc<dyn Navigator>,
    audio: Arc<dyn AudioCapture>,
    transcriber: Option<Arc<dyn Transcriber>>,
    resolver: PageIntentResolver,
    config: RootConfig,
    container_id: String,
    tokens: RequestTokens,
    state: Mutex<SearchState>,
    recorder: tokio::sync::Mutex<Option<VoiceRecorder>>,
    click_listener: Mutex<Option<ListenerHandle>>,
}

impl SearchOrchestrator {
    /// Mounts a search surface rooted at the element `container_id`.
    ///
    /// Installs this instance's outside-click listener and loads personalized
    /// recommendations (best-effort).
    pub async fn mount(
        deps: SearchDeps,
        container_id: impl Into<String>,
        listeners: &DocumentListeners,
    ) -> Arc<Self> {
        let SearchDeps {
            backend,
            navigator,
            audio,
            transcriber,
            table,
            config,
        } = deps;

        let resolver = PageIntentResolver::new(table)
            .with_max_suggestions(config.suggestions.max_page_suggestions);
        let session = SearchSession::new(config.voice.default_language);

        let orchestrator = Arc::new(Self {
            backend,
            navigator,
            audio,
            transcriber,
            resolver,
            config,
            container_id: container_id.into(),
            tokens: RequestTokens::new(),
            state: Mutex::new(SearchState::new(session)),
            recorder: tokio::sync::Mutex::new(None),
            click_listener: Mutex::new(None),
        });

        let weak = Arc::downgrade(&orchestrator);
        let handle = listeners.add_click_listener(Arc::new(move |event: &PointerEvent| {
            if let Some(orchestrator) = weak.upgrade() {
                orchestrator.handle_document_click(event);
            }
        }));
        *lock(&orchestrator.click_listener) = Some(handle);

        orchestrator.load_recommendations().await;

        tracing::info!(
            session_id = %orchestrator.session_id(),
            container = %orchestrator.container_id,
            "Search surface mounted"
        );
        orchestrator
    }

    /// Tears the surface down: removes the click listener, discards any
    /// active recording and invalidates in-flight requests.
    pub async fn unmount(&self) {
        lock(&self.click_listener).take();
        if let Some(mut recorder) = self.recorder.lock().await.take() {
            recorder.cancel();
        }
        let mut state = lock(&self.state);
        state.recording = None;
        state.session.invalidate();
        tracing::info!(session_id = %state.session.id, "Search surface unmounted");
    }

    pub fn session_id(&self) -> String {
        lock(&self.state).session.id.clone()
    }

    /// Snapshot for the result renderer.
    pub fn view(&self) -> SearchView {
        SearchView::capture(&lock(&self.state), &self.config.trending_terms)
    }

    // ============================================================================
    // Text channel and suggestion pipeline
    // ============================================================================

    /// Handles every keystroke value of the search box.
    ///
    /// Blank text clears suggestions and results immediately without a
    /// backend call. Otherwise page suggestions are shown at once and the AI
    /// suggestions (plus, for longer queries, the analysis) are fetched under
    /// a fresh request token. Backend failures only cost the AI part.
    pub async fn on_query_change(&self, text: &str) {
        if text.trim().is_empty() {
            self.clear_query();
            return;
        }

        let pages = self
            .resolver
            .suggest_pages(text)
            .into_iter()
            .map(SuggestionItem::page)
            .collect();

        let token = self.tokens.issue();
        {
            let mut state = lock(&self.state);
            state.session.query_text = text.to_string();
            state.session.input_channel = InputChannel::Text;
            state.session.activate(token);
            state.begin_suggestions(pages);
            state.session.visibility.apply(UiEvent::QueryEntered);
        }
        tracing::debug!(%token, query = %text, "Fetching suggestions");

        let suggestions = async {
            let outcome = self.backend.fetch_suggestions(text).await;
            self.apply_ai_suggestions(token, outcome);
        };
        let analysis = async {
            if text.trim().chars().count() > self.config.suggestions.analysis_min_chars {
                let outcome = self.backend.analyze_query(text).await;
                self.apply_analysis(token, outcome);
            }
        };
        futures::join!(suggestions, analysis);
    }

    fn apply_ai_suggestions(&self, token: RequestToken, outcome: Result<Vec<SuggestionItem>>) {
        let items = match outcome {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(%token, "AI suggestions unavailable, keeping page suggestions: {}", e);
                return;
            }
        };

        let max = self.config.suggestions.max_ai_suggestions;
        let applied = self.with_current(token, |state| {
            state.ai_suggestions = items.into_iter().take(max).collect();
        });
        if let Err(e) = applied {
            tracing::trace!("{}", e);
        }
    }

    fn apply_analysis(&self, token: RequestToken, outcome: Result<QueryAnalysis>) {
        let analysis = match outcome {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::debug!(%token, "Query analysis failed: {}", e);
                return;
            }
        };

        let applied = self.with_current(token, |state| {
            state.refinements = analysis
                .refinements
                .iter()
                .map(|text| SuggestionItem::ai(text.clone()))
                .collect();
            state.analysis = Some(analysis);
        });
        if let Err(e) = applied {
            tracing::trace!("{}", e);
        }
    }

    /// Runs `apply` only while `token` is the live token.
    fn with_current<F>(&self, token: RequestToken, apply: F) -> Result<()>
    where
        F: FnOnce(&mut SearchState),
    {
        let mut state = lock(&self.state);
        if !state.session.is_current(token) {
            return Err(HaatError::stale(token.value()));
        }
        apply(&mut state);
        Ok(())
    }

    fn clear_query(&self) {
        let mut state = lock(&self.state);
        state.session.invalidate();
        state.session.query_text.clear();
        state.clear_suggestions();
        state.clear_results();
        state.session.visibility.apply(UiEvent::QueryCleared);
    }

    /// Explicit clear button: resets the session to its defaults.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.session.reset();
        state.clear_suggestions();
        state.clear_results();
        state.alert = None;
        tracing::debug!(session_id = %state.session.id, "Search session cleared");
    }

    // ============================================================================
    // Intent classification and dispatch
    // ============================================================================

    /// Submits a typed query (Enter key or search button).
    ///
    /// Exact page names navigate without any backend call. Everything else
    /// goes to the conversational or the keyword endpoint.
    pub async fn submit(&self, query: &str) -> DispatchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return DispatchOutcome::Ignored;
        }
        lock(&self.state).remember(query);

        match intent::classify(&self.resolver, query) {
            QueryIntent::Navigate(route) => {
                {
                    let mut state = lock(&self.state);
                    state.session.invalidate();
                    state.session.query_text = query.to_string();
                    state.session.visibility.apply(UiEvent::EscapePressed);
                }
                tracing::info!(%query, %route, "Direct page match");
                self.navigator.navigate(NavigationTarget::page(route.clone()));
                DispatchOutcome::Navigated(route)
            }
            QueryIntent::Conversational => {
                self.dispatch(SearchRequest::Conversational(query)).await
            }
            QueryIntent::Keyword => self.dispatch(SearchRequest::Keyword(query)).await,
        }
    }

    /// Searches with a finished voice recording.
    pub async fn submit_voice(&self, audio: AudioBlob) -> DispatchOutcome {
        self.dispatch(SearchRequest::Voice(audio)).await
    }

    /// Handles a photo picked for visual search.
    pub async fn on_image_selected(&self, file: ImageBlob) -> DispatchOutcome {
        self.dispatch(SearchRequest::Image(file, PickerKind::Image)).await
    }

    /// Handles a QR code image; decoded by the image endpoint.
    pub async fn on_qr_selected(&self, file: ImageBlob) -> DispatchOutcome {
        self.dispatch(SearchRequest::Image(file, PickerKind::Qr)).await
    }

    async fn dispatch(&self, request: SearchRequest<'_>) -> DispatchOutcome {
        let token = self.tokens.issue();
        let operation = request.operation();

        let (filters, language) = {
            let mut state = lock(&self.state);
            state.session.activate(token);
            state.session.input_channel = request.channel();
            if let SearchRequest::Keyword(text) | SearchRequest::Conversational(text) = &request {
                state.session.query_text = text.to_string();
            }
            state.clear_suggestions();
            state.clear_results();
            state.session.visibility.apply(UiEvent::SearchSubmitted);
            (state.filters.clone(), state.session.voice_language)
        };
        tracing::debug!(%token, operation, channel = %request.channel(), "Dispatching search");

        let outcome = match &request {
            SearchRequest::Keyword(text) => self.backend.search_with_text(text, &filters).await,
            SearchRequest::Conversational(text) => {
                self.backend.search_conversational(text, &filters).await
            }
            SearchRequest::Voice(audio) => self.backend.search_by_voice(audio, language).await,
            SearchRequest::Image(image, _) => self.backend.search_by_image(image).await,
        };

        self.settle(token, operation, outcome)
    }

    /// Applies a search completion; failures become an empty result set with
    /// an error so the loading phase always ends.
    fn settle(
        &self,
        token: RequestToken,
        operation: &str,
        outcome: Result<Vec<SearchResult>>,
    ) -> DispatchOutcome {
        let mut dispatch = DispatchOutcome::Superseded;
        let applied = self.with_current(token, |state| {
            match &outcome {
                Ok(results) => {
                    state.results = results.clone();
                    state.error = None;
                    dispatch = DispatchOutcome::Results(results.len());
                }
                Err(e) => {
                    state.results.clear();
                    state.error = Some(e.user_message());
                    dispatch = DispatchOutcome::Failed(e.to_string());
                }
            }
            state.session.visibility.apply(UiEvent::ResultsSettled);
        });

        match (&applied, &outcome) {
            (Err(stale), _) => tracing::trace!("{}", stale),
            (Ok(()), Err(e)) => tracing::warn!(%token, operation, "Search failed: {}", e),
            (Ok(()), Ok(results)) => {
                tracing::debug!(%token, operation, count = results.len(), "Search settled")
            }
        }
        dispatch
    }

    // ============================================================================
    // Voice channel
    // ============================================================================

    /// Starts a voice recording.
    ///
    /// A refused microphone is reported both as the returned error and as a
    /// user-visible alert in the view.
    pub async fn start_recording(&self) -> Result<()> {
        let mut slot = self.recorder.lock().await;
        if slot.is_some() {
            return Err(HaatError::RecordingInProgress);
        }

        let language = lock(&self.state).session.voice_language;
        let interval = Duration::from_millis(self.config.voice.meter_interval_ms.max(1));

        match VoiceRecorder::start(
            self.audio.as_ref(),
            self.transcriber.clone(),
            language,
            interval,
        )
        .await
        {
            Ok(recorder) => {
                let mut state = lock(&self.state);
                state.alert = None;
                state.recording = Some(RecordingFeed {
                    amplitude: recorder.amplitude(),
                    transcript: recorder.transcript(),
                });
                *slot = Some(recorder);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Voice recording could not start: {}", e);
                lock(&self.state).alert = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Stops the active recording and searches with it.
    ///
    /// Safe to call repeatedly; only the first call after a start does
    /// anything.
    pub async fn stop_recording(&self) -> DispatchOutcome {
        let Some(mut recorder) = self.recorder.lock().await.take() else {
            return DispatchOutcome::Ignored;
        };
        let audio = recorder.stop().await;
        lock(&self.state).recording = None;

        match audio {
            Some(audio) if !audio.bytes.is_empty() => self.submit_voice(audio).await,
            _ => {
                tracing::debug!("Recording produced no audio");
                DispatchOutcome::Ignored
            }
        }
    }

    /// Stops the active recording without searching.
    pub async fn cancel_recording(&self) {
        if let Some(mut recorder) = self.recorder.lock().await.take() {
            recorder.cancel();
        }
        lock(&self.state).recording = None;
    }

    pub fn set_voice_language(&self, language: VoiceLanguage) {
        lock(&self.state).session.voice_language = language;
    }

    // ============================================================================
    // UI events
    // ============================================================================

    pub fn on_focus(&self) {
        let mut state = lock(&self.state);
        let has_history = !state.history.is_empty() || !state.session.query_text.is_empty();
        state
            .session
            .visibility
            .apply(UiEvent::Focused { has_history });
    }

    pub fn on_escape(&self) {
        lock(&self.state)
            .session
            .visibility
            .apply(UiEvent::EscapePressed);
    }

    pub fn toggle_filters(&self) {
        lock(&self.state)
            .session
            .visibility
            .apply(UiEvent::FiltersToggled);
    }

    /// Document-level click; dismisses the surface when the click landed
    /// outside this instance's container.
    pub fn handle_document_click(&self, event: &PointerEvent) {
        if event.is_inside(&self.container_id) {
            return;
        }
        lock(&self.state)
            .session
            .visibility
            .apply(UiEvent::OutsideClick);
    }

    /// Re-entry point for renderer events.
    pub async fn handle_renderer_event(&self, event: RendererEvent) -> DispatchOutcome {
        match event {
            RendererEvent::SuggestionClick(item) => self.submit(&item.text).await,
            RendererEvent::TrendingClick(term) => self.submit(&term).await,
            RendererEvent::ResultClick(result) => {
                let target = route_result(&result);
                let path = target.path.clone();
                lock(&self.state)
                    .session
                    .visibility
                    .apply(UiEvent::EscapePressed);
                tracing::debug!(id = %result.id, kind = %result.kind, %path, "Routing result");
                self.navigator.navigate(target);
                DispatchOutcome::Navigated(path)
            }
            RendererEvent::FiltersApply(filters) => self.apply_filters(filters).await,
        }
    }

    /// Stores new filters, closes the overlay and re-runs the current text
    /// query, if any.
    async fn apply_filters(&self, filters: Filters) -> DispatchOutcome {
        let rerun = {
            let mut state = lock(&self.state);
            state.filters = filters;
            state.session.visibility.close_filters();
            let query = state.session.query_text.trim().to_string();
            (state.session.input_channel == InputChannel::Text && !query.is_empty())
                .then_some(query)
        };

        match rerun {
            Some(query) => self.submit(&query).await,
            None => DispatchOutcome::Ignored,
        }
    }

    async fn load_recommendations(&self) {
        match self.backend.get_personalized_recommendations().await {
            Ok(recommendations) => {
                tracing::debug!(count = recommendations.len(), "Loaded recommendations");
                lock(&self.state).recommendations = recommendations;
            }
            Err(e) => tracing::warn!("Recommendations unavailable: {}", e),
        }
    }
}
