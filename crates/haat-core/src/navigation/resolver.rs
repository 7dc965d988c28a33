use std::sync::Arc;

use super::table::{NavigationTable, normalize};

const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// Maps free text onto application pages.
///
/// Pure: no I/O, no interior state. The table is injected so tests can use
/// fixture tables.
#[derive(Debug, Clone)]
pub struct PageIntentResolver {
    table: Arc<NavigationTable>,
    max_suggestions: usize,
}

impl PageIntentResolver {
    pub fn new(table: Arc<NavigationTable>) -> Self {
        Self {
            table,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }

    /// Sets the maximum number of phrases `suggest_pages` returns.
    pub fn with_max_suggestions(mut self, max_suggestions: usize) -> Self {
        self.max_suggestions = max_suggestions;
        self
    }

    pub fn table(&self) -> &NavigationTable {
        &self.table
    }

    /// Returns the route for a query naming a page exactly (case-insensitive,
    /// surrounding whitespace ignored).
    pub fn resolve_direct_match(&self, query: &str) -> Option<String> {
        let normalized = normalize(query);
        if normalized.is_empty() {
            return None;
        }
        self.table.route_for(&normalized).map(str::to_string)
    }

    /// Returns up to `max_suggestions` page phrases related to the query.
    ///
    /// A phrase matches when either string contains the other. Results keep
    /// table-declaration order.
    pub fn suggest_pages(&self, query: &str) -> Vec<String> {
        let normalized = normalize(query);
        if normalized.is_empty() {
            return Vec::new();
        }

        self.table
            .entries()
            .iter()
            .filter(|e| e.phrase.contains(&normalized) || normalized.contains(&e.phrase))
            .take(self.max_suggestions)
            .map(|e| e.phrase.clone())
            .collect()
    }
}
