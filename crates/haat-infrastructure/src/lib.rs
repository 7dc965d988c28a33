//! Adapters binding the search core to the outside world: the HTTP backend,
//! configuration and navigation-table files, and logging.

pub mod config_service;
pub mod dto;
pub mod http_backend;
pub mod logging;
pub mod navigation_table;
pub mod paths;
pub mod tracing_layer;

pub use crate::config_service::ConfigService;
pub use crate::http_backend::HttpSearchBackend;
pub use crate::logging::{LoggingGuard, LoggingOptions, init_logging};
pub use crate::navigation_table::load_navigation_table;
pub use crate::paths::HaatPaths;
pub use crate::tracing_layer::{DiagnosticEvent, DiagnosticsLayer};
