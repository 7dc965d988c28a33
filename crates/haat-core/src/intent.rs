//! Query intent classification.
//!
//! Decides whether a submitted query names a page, is a natural-language
//! request, or is a plain keyword search.

use serde::{Deserialize, Serialize};

use crate::navigation::PageIntentResolver;

/// Phrases that mark a query as conversational.
///
/// English only, even when the voice locale is Bengali.
pub const CONVERSATIONAL_PHRASES: &[&str] = &[
    "show me",
    "find",
    "i want",
    "i need",
    "get me",
    "what are",
    "where can",
    "how to",
];

/// What a submitted text query should do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "route", rename_all = "snake_case")]
pub enum QueryIntent {
    /// The query names a page; navigate there without searching.
    Navigate(String),
    /// Natural-language request for the conversational endpoint.
    Conversational,
    /// Literal term matching.
    Keyword,
}

/// True when the lowercased query contains any conversational phrase.
pub fn is_conversational(query: &str) -> bool {
    let query = query.to_lowercase();
    CONVERSATIONAL_PHRASES
        .iter()
        .any(|phrase| query.contains(phrase))
}

/// Classifies a submitted text query. Direct page matches take priority.
pub fn classify(resolver: &PageIntentResolver, query: &str) -> QueryIntent {
    if let Some(route) = resolver.resolve_direct_match(query) {
        return QueryIntent::Navigate(route);
    }
    if is_conversational(query) {
        QueryIntent::Conversational
    } else {
        QueryIntent::Keyword
    }
}
