//! Page navigation domain.
//!
//! Free text that names an application page ("cart", "my orders") is resolved
//! against an immutable [`NavigationTable`] instead of being sent to the
//! search backend.
//!
//! # Module Structure
//!
//! - `table`: The static phrase → route table (`NavigationTable`, `PageNavigationEntry`)
//! - `resolver`: Direct-match lookup and page suggestions (`PageIntentResolver`)
//! - `target`: Navigation requests and the `Navigator` seam

mod resolver;
mod table;
mod target;

pub use resolver::PageIntentResolver;
pub use table::{NavigationTable, PageNavigationEntry};
pub use target::{NavigationTarget, Navigator};
