use serde::{Deserialize, Serialize};

use crate::search::SearchResult;

/// A navigation request handed to the host application's router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationTarget {
    /// Route path, e.g. `/product/42`.
    pub path: String,
    /// Query string parameters, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<(String, String)>,
    /// Result carried to the destination page so it can render without
    /// fetching it again.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<SearchResult>,
}

impl NavigationTarget {
    /// A plain page route without parameters or state.
    pub fn page(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            state: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_state(mut self, result: SearchResult) -> Self {
        self.state = Some(result);
        self
    }
}

/// The host application's router.
///
/// Navigation is synchronous and infallible from the orchestrator's point of
/// view; a host that cannot navigate logs and ignores the request.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: NavigationTarget);
}
