//! UI visibility state machine.
//!
//! One set of input events drives the suggestion, result and filter panels,
//! whichever physical layout (desktop bar, mobile sheet) renders them.

use serde::{Deserialize, Serialize};

/// The primary phase rendered by the search surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Idle,
    ShowingSuggestions,
    /// A dispatch is in flight; the results panel shows a spinner.
    Loading,
    ShowingResults,
}

/// Input events understood by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Non-empty text was typed.
    QueryEntered,
    /// The input received focus.
    Focused { has_history: bool },
    /// A search was submitted (Enter, button, suggestion or trending click).
    SearchSubmitted,
    /// The submitted search finished, successfully or not.
    ResultsSettled,
    /// The query was cleared.
    QueryCleared,
    /// A pointer click landed outside the search container.
    OutsideClick,
    EscapePressed,
    /// The filter button was pressed.
    FiltersToggled,
}

/// Panel flags owned by one search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibilityState {
    suggestions: bool,
    results: bool,
    loading: bool,
    filters: bool,
}

impl VisibilityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event. Every event is a single transition; Escape hides
    /// suggestions and results together.
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::QueryEntered => {
                self.suggestions = true;
                self.results = false;
                self.loading = false;
            }
            UiEvent::Focused { has_history } => {
                if has_history && !self.results && !self.loading {
                    self.suggestions = true;
                }
            }
            UiEvent::SearchSubmitted => {
                self.suggestions = false;
                self.results = true;
                self.loading = true;
            }
            UiEvent::ResultsSettled => {
                self.loading = false;
            }
            UiEvent::QueryCleared | UiEvent::OutsideClick | UiEvent::EscapePressed => {
                *self = Self::default();
            }
            UiEvent::FiltersToggled => {
                self.filters = !self.filters;
            }
        }
    }

    /// Closes the filter overlay without touching the panels underneath.
    pub fn close_filters(&mut self) {
        self.filters = false;
    }

    pub fn phase(&self) -> Visibility {
        if self.results && self.loading {
            Visibility::Loading
        } else if self.results {
            Visibility::ShowingResults
        } else if self.suggestions {
            Visibility::ShowingSuggestions
        } else {
            Visibility::Idle
        }
    }

    pub fn filters_open(&self) -> bool {
        self.filters
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == Visibility::Idle && !self.filters
    }
}

/// A pointer click as seen by a document-level listener.
///
/// `path` lists element ids from the clicked element up to the document root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PointerEvent {
    pub path: Vec<String>,
}

impl PointerEvent {
    pub fn new<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// True when the click landed on `container_id` or one of its descendants.
    pub fn is_inside(&self, container_id: &str) -> bool {
        self.path.iter().any(|id| id == container_id)
    }
}
