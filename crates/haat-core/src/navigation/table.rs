use serde::{Deserialize, Serialize};

/// One `(phrase → route)` pair of the navigation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNavigationEntry {
    /// Normalized (trimmed, lowercase) phrase the user may type.
    pub phrase: String,
    /// Application route the phrase navigates to.
    pub route: String,
}

impl PageNavigationEntry {
    pub fn new(phrase: impl AsRef<str>, route: impl Into<String>) -> Self {
        Self {
            phrase: normalize(phrase.as_ref()),
            route: route.into(),
        }
    }
}

/// Immutable phrase → route table, loaded once per process.
///
/// Entries keep their declaration order; page suggestions are reported in
/// that order. When a phrase is declared twice the first declaration wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "NavigationTableFile")]
pub struct NavigationTable {
    #[serde(rename = "page")]
    entries: Vec<PageNavigationEntry>,
}

/// On-disk shape: `[[page]] phrase = "..." route = "..."`.
#[derive(Deserialize)]
struct NavigationTableFile {
    #[serde(rename = "page", default)]
    entries: Vec<PageNavigationEntry>,
}

impl From<NavigationTableFile> for NavigationTable {
    fn from(file: NavigationTableFile) -> Self {
        Self::new(file.entries)
    }
}

impl NavigationTable {
    /// Builds a table from entries, normalizing phrases and dropping later
    /// duplicates and empty phrases.
    pub fn new(entries: impl IntoIterator<Item = PageNavigationEntry>) -> Self {
        let mut deduped: Vec<PageNavigationEntry> = Vec::new();
        for entry in entries {
            let entry = PageNavigationEntry::new(&entry.phrase, entry.route);
            if entry.phrase.is_empty() || deduped.iter().any(|e| e.phrase == entry.phrase) {
                continue;
            }
            deduped.push(entry);
        }
        Self { entries: deduped }
    }

    /// Built-in marketplace pages used when no table file is configured.
    pub fn builtin() -> Self {
        const PAGES: &[(&str, &str)] = &[
            ("home", "/"),
            ("dashboard", "/dashboard"),
            ("cart", "/cart"),
            ("my cart", "/cart"),
            ("checkout", "/checkout"),
            ("wishlist", "/wishlist"),
            ("orders", "/orders"),
            ("my orders", "/orders"),
            ("track order", "/orders/track"),
            ("profile", "/profile"),
            ("my account", "/profile"),
            ("settings", "/settings"),
            ("notifications", "/notifications"),
            ("categories", "/categories"),
            ("all categories", "/categories"),
            ("vendors", "/vendors"),
            ("brands", "/brands"),
            ("offers", "/offers"),
            ("flash sale", "/offers/flash-sale"),
            ("become a seller", "/seller/register"),
            ("seller dashboard", "/seller/dashboard"),
            ("help", "/help"),
            ("contact", "/contact"),
            ("about", "/about"),
            ("login", "/login"),
            ("register", "/register"),
        ];

        Self::new(
            PAGES
                .iter()
                .map(|(phrase, route)| PageNavigationEntry::new(phrase, *route)),
        )
    }

    pub fn entries(&self) -> &[PageNavigationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact lookup of an already-normalized phrase.
    pub(crate) fn route_for(&self, normalized: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.phrase == normalized)
            .map(|e| e.route.as_str())
    }
}

/// Trim and lowercase, the only normalization applied to page phrases.
pub(crate) fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
