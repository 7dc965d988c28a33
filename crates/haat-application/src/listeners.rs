//! Document-level pointer listeners.
//!
//! Each mounted orchestrator installs its own outside-click listener here and
//! holds the returned [`ListenerHandle`]; dropping the handle removes exactly
//! that listener, so sibling instances never interfere with each other.

use std::sync::{Arc, Mutex, Weak};

use haat_core::visibility::PointerEvent;

use crate::lock;

pub type ClickHandler = Arc<dyn Fn(&PointerEvent) + Send + Sync>;

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    handlers: Vec<(u64, ClickHandler)>,
}

/// Process-wide registry of document click listeners.
#[derive(Clone, Default)]
pub struct DocumentListeners {
    table: Arc<Mutex<ListenerTable>>,
}

impl DocumentListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a click listener for as long as the handle lives.
    #[must_use = "the listener is removed when the handle is dropped"]
    pub fn add_click_listener(&self, handler: ClickHandler) -> ListenerHandle {
        let mut table = lock(&self.table);
        table.next_id += 1;
        let id = table.next_id;
        table.handlers.push((id, handler));

        ListenerHandle {
            id,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Delivers a click to every registered listener.
    ///
    /// Handlers run outside the registry lock, so they may add or remove
    /// listeners themselves.
    pub fn dispatch_click(&self, event: &PointerEvent) {
        let handlers: Vec<ClickHandler> = lock(&self.table)
            .handlers
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.table).handlers.len()
    }
}

impl std::fmt::Debug for DocumentListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentListeners")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Keeps one listener installed; removes it on drop.
#[derive(Debug)]
pub struct ListenerHandle {
    id: u64,
    table: Weak<Mutex<ListenerTable>>,
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            lock(&table).handlers.retain(|(id, _)| *id != self.id);
        }
    }
}
