//! Wires configuration, adapters and the orchestrator together.

use std::sync::Arc;

use anyhow::{Context, Result};
use haat_application::{DocumentListeners, SearchDeps, SearchOrchestrator};
use haat_core::config::RootConfig;
use haat_infrastructure::config_service::validate;
use haat_infrastructure::navigation_table::load_or_builtin;
use haat_infrastructure::{ConfigService, HaatPaths, HttpSearchBackend};

use crate::adapters::{FileAudioCapture, TerminalNavigator};

/// Element id the CLI's search surface is mounted under.
pub const CONTAINER_ID: &str = "haat-cli";

pub struct App {
    pub search: Arc<SearchOrchestrator>,
    pub audio: Arc<FileAudioCapture>,
    pub navigator: Arc<TerminalNavigator>,
    pub listeners: DocumentListeners,
    pub config: RootConfig,
}

pub async fn bootstrap(paths: HaatPaths, backend_url: Option<String>) -> Result<App> {
    let config_service = ConfigService::new(paths);
    let mut config = config_service.get_config();
    if let Some(url) = backend_url {
        config.backend.base_url = url;
    }
    validate(&config)?;

    let table_path = config_service.navigation_table_path();
    let table = load_or_builtin(table_path.as_deref())
        .await
        .context("Failed to load navigation table")?;

    let backend = HttpSearchBackend::new(&config.backend)?;
    tracing::info!(
        backend = backend.base_url(),
        pages = table.len(),
        "[Bootstrap] Search backend configured"
    );

    let audio = Arc::new(FileAudioCapture::default());
    let navigator = Arc::new(TerminalNavigator::default());
    let listeners = DocumentListeners::new();

    let search = SearchOrchestrator::mount(
        SearchDeps {
            backend: Arc::new(backend),
            navigator: navigator.clone(),
            audio: audio.clone(),
            transcriber: None,
            table: Arc::new(table),
            config: config.clone(),
        },
        CONTAINER_ID,
        &listeners,
    )
    .await;

    Ok(App {
        search,
        audio,
        navigator,
        listeners,
        config,
    })
}
