//! Search domain: result/suggestion models, filters, and the backend seam.
//!
//! - `model`: `SearchResult`, `SuggestionItem`, `QueryAnalysis`, input blobs
//! - `filters`: `Filters` passed through to the backend untouched
//! - `backend`: the `SearchBackend` trait

pub mod backend;
pub mod filters;
pub mod model;

pub use backend::SearchBackend;
pub use filters::{Availability, Filters};
pub use model::{
    AudioBlob, ImageBlob, InputChannel, QueryAnalysis, ResultKind, SearchResult, SuggestionItem,
    SuggestionSource, VoiceLanguage,
};
