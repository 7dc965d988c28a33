//! Application layer for HAAT.
//!
//! This crate wires the pure domain pieces of `haat-core` into the live
//! search orchestrator: the suggestion pipeline, the intent dispatcher, the
//! voice recorder and the image/QR pickers, all driven through one
//! [`SearchOrchestrator`] per mounted search surface.

pub mod listeners;
pub mod orchestrator;
pub mod picker;
pub mod state;
pub mod voice;

#[cfg(test)]
mod orchestrator_test;
#[cfg(test)]
mod test_support;

pub use listeners::{DocumentListeners, ListenerHandle};
pub use orchestrator::{DispatchOutcome, RendererEvent, SearchDeps, SearchOrchestrator};
pub use picker::PickerKind;
pub use state::SearchView;
pub use voice::VoiceRecorder;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a std mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
