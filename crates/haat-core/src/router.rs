//! Maps a clicked search result to a navigation target.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::navigation::NavigationTarget;
use crate::search::{ResultKind, SearchResult};

static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{M}\p{N}]+").expect("slug pattern is valid"));

/// Lowercases and joins runs of letters/digits with `-`.
///
/// Letters with combining marks (Bengali vowel signs) are kept intact.
pub fn slugify(text: &str) -> String {
    NON_SLUG_CHARS
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Returns the destination for a result. Total over every result kind:
/// unknown kinds fall back to a full-text search for the title.
pub fn route_result(result: &SearchResult) -> NavigationTarget {
    match &result.kind {
        ResultKind::Product => {
            NavigationTarget::page(format!("/product/{}", result.id)).with_state(result.clone())
        }
        ResultKind::Vendor => {
            NavigationTarget::page(format!("/vendor/{}", result.id)).with_state(result.clone())
        }
        ResultKind::Category => {
            let key = listing_key(result.category.as_deref(), &result.title);
            NavigationTarget::page(format!("/category/{key}"))
        }
        ResultKind::Brand => {
            let key = listing_key(result.brand.as_deref(), &result.title);
            NavigationTarget::page(format!("/brand/{key}"))
        }
        ResultKind::Other(tag) => NavigationTarget::page("/search")
            .with_query("q", result.title.clone())
            .with_query("type", tag.clone()),
    }
}

fn listing_key(field: Option<&str>, title: &str) -> String {
    match field.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => slugify(title),
    }
}
