//! Mutable orchestrator state and the read-only view handed to renderers.

use std::collections::HashSet;

use haat_core::capture::{VoiceCommand, detect_voice_command};
use haat_core::search::{
    Filters, InputChannel, QueryAnalysis, SearchResult, SuggestionItem, VoiceLanguage,
};
use haat_core::session::SearchSession;
use haat_core::visibility::Visibility;
use serde::Serialize;
use tokio::sync::watch;

const MAX_HISTORY: usize = 10;

/// Everything the orchestrator mutates. Guarded by one mutex that is never
/// held across an await.
#[derive(Debug)]
pub(crate) struct SearchState {
    pub session: SearchSession,
    /// Suggestion batches for the active token only.
    pub page_suggestions: Vec<SuggestionItem>,
    pub ai_suggestions: Vec<SuggestionItem>,
    pub refinements: Vec<SuggestionItem>,
    pub analysis: Option<QueryAnalysis>,
    pub results: Vec<SearchResult>,
    pub error: Option<String>,
    pub recommendations: Vec<SearchResult>,
    pub filters: Filters,
    pub alert: Option<String>,
    /// Queries submitted during this mount, newest first. Not persisted.
    pub history: Vec<String>,
    pub recording: Option<RecordingFeed>,
}

/// Live feeds of an active recording.
#[derive(Debug)]
pub(crate) struct RecordingFeed {
    pub amplitude: watch::Receiver<u8>,
    pub transcript: watch::Receiver<String>,
}

impl SearchState {
    pub fn new(session: SearchSession) -> Self {
        Self {
            session,
            page_suggestions: Vec::new(),
            ai_suggestions: Vec::new(),
            refinements: Vec::new(),
            analysis: None,
            results: Vec::new(),
            error: None,
            recommendations: Vec::new(),
            filters: Filters::default(),
            alert: None,
            history: Vec::new(),
            recording: None,
        }
    }

    /// Starts a new suggestion batch; earlier batches are superseded.
    pub fn begin_suggestions(&mut self, pages: Vec<SuggestionItem>) {
        self.page_suggestions = pages;
        self.ai_suggestions.clear();
        self.refinements.clear();
        self.analysis = None;
    }

    pub fn clear_suggestions(&mut self) {
        self.begin_suggestions(Vec::new());
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
        self.error = None;
    }

    pub fn remember(&mut self, query: &str) {
        self.history.retain(|q| !q.eq_ignore_ascii_case(query));
        self.history.insert(0, query.to_string());
        self.history.truncate(MAX_HISTORY);
    }

    /// Page suggestions first, then AI suggestions, then analysis
    /// refinements; case-insensitive duplicates keep their first position.
    pub fn merged_suggestions(&self) -> Vec<SuggestionItem> {
        let mut seen = HashSet::new();
        self.page_suggestions
            .iter()
            .chain(&self.ai_suggestions)
            .chain(&self.refinements)
            .filter(|item| seen.insert(item.text.trim().to_lowercase()))
            .cloned()
            .collect()
    }
}

/// Snapshot consumed by the result renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchView {
    pub phase: Visibility,
    pub filters_open: bool,
    pub query: String,
    pub input_channel: InputChannel,
    pub voice_language: VoiceLanguage,
    pub suggestions: Vec<SuggestionItem>,
    pub results: Vec<SearchResult>,
    pub recommendations: Vec<SearchResult>,
    pub trending: Vec<String>,
    pub history: Vec<String>,
    pub filters: Filters,
    pub error: Option<String>,
    pub alert: Option<String>,
    pub is_recording: bool,
    /// The record control is disabled while a recording is active.
    pub record_enabled: bool,
    pub amplitude: u8,
    pub live_transcript: Option<String>,
    pub voice_command: Option<VoiceCommand>,
}

impl SearchView {
    pub(crate) fn capture(state: &SearchState, trending: &[String]) -> Self {
        let (amplitude, live_transcript) = match &state.recording {
            Some(feed) => {
                let transcript = feed.transcript.borrow().clone();
                (
                    *feed.amplitude.borrow(),
                    (!transcript.is_empty()).then_some(transcript),
                )
            }
            None => (0, None),
        };
        let voice_command = live_transcript.as_deref().and_then(detect_voice_command);
        let is_recording = state.recording.is_some();

        Self {
            phase: state.session.visibility.phase(),
            filters_open: state.session.visibility.filters_open(),
            query: state.session.query_text.clone(),
            input_channel: state.session.input_channel,
            voice_language: state.session.voice_language,
            suggestions: state.merged_suggestions(),
            results: state.results.clone(),
            recommendations: state.recommendations.clone(),
            trending: trending.to_vec(),
            history: state.history.clone(),
            filters: state.filters.clone(),
            error: state.error.clone(),
            alert: state.alert.clone(),
            is_recording,
            record_enabled: !is_recording,
            amplitude,
            live_transcript,
            voice_command,
        }
    }
}
