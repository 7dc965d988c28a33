//! Search session state and request tokens.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::search::{InputChannel, VoiceLanguage};
use crate::visibility::VisibilityState;

/// Identifies one asynchronous request issued by a session.
///
/// Tokens are compared for equality only; a completion is applied when its
/// token is still the session's active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh request tokens. Never repeats within one process.
#[derive(Debug, Default)]
pub struct RequestTokens {
    next: AtomicU64,
}

impl RequestTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// The live state of one search interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSession {
    pub id: String,
    pub query_text: String,
    pub input_channel: InputChannel,
    pub visibility: VisibilityState,
    /// The only token whose completions may still change visible state.
    pub active_request_token: Option<RequestToken>,
    pub voice_language: VoiceLanguage,
}

impl SearchSession {
    pub fn new(voice_language: VoiceLanguage) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            query_text: String::new(),
            input_channel: InputChannel::Text,
            visibility: VisibilityState::new(),
            active_request_token: None,
            voice_language,
        }
    }

    /// Makes `token` the live token, superseding any in-flight request.
    pub fn activate(&mut self, token: RequestToken) {
        self.active_request_token = Some(token);
    }

    /// Forgets the live token so every in-flight completion is discarded.
    pub fn invalidate(&mut self) {
        self.active_request_token = None;
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.active_request_token == Some(token)
    }

    /// Back to defaults, keeping the session id and the chosen voice
    /// language.
    pub fn reset(&mut self) {
        let id = std::mem::take(&mut self.id);
        *self = Self {
            id,
            ..Self::new(self.voice_language)
        };
    }
}
