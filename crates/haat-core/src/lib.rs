//! Domain layer of the Haat search orchestration core.
//!
//! Pure types and logic (no I/O): the page navigation table and resolver,
//! intent classification, the UI visibility state machine, the result router,
//! and the traits behind which the backend, the host router and capture
//! hardware are injected.

pub mod capture;
pub mod config;
pub mod error;
pub mod intent;
pub mod navigation;
pub mod router;
pub mod search;
pub mod session;
pub mod visibility;

// Re-export common error type
pub use error::{HaatError, Result};
