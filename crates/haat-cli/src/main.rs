use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use haat_application::DispatchOutcome;
use haat_infrastructure::logging::LoggingOptions;
use haat_infrastructure::{HaatPaths, init_logging};
use tokio::sync::mpsc;

mod adapters;
mod bootstrap;
mod render;
mod repl;

#[derive(Parser)]
#[command(name = "haat")]
#[command(about = "HAAT - marketplace search from the terminal", long_about = None)]
struct Cli {
    /// Configuration directory (defaults to ~/.config/haat)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Backend base URL, overriding config and HAAT_BACKEND_URL
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Log filter used when HAAT_LOG/RUST_LOG are unset (e.g. "haat=debug")
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show page and AI suggestions for a partial query
    Suggest { query: String },
    /// Run one search and print the results
    Search {
        query: String,
        /// Print the final view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive search session
    Repl {
        /// Stream orchestrator diagnostics below each command
        #[arg(long)]
        events: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = HaatPaths::new(cli.config_dir.clone());

    let (diagnostics_tx, diagnostics_rx) = match &cli.command {
        Commands::Repl { events: true } => {
            let (tx, rx) = mpsc::unbounded_channel();
            (Some(tx), Some(rx))
        }
        _ => (None, None),
    };
    let _logging = init_logging(LoggingOptions {
        default_filter: cli.log.clone(),
        log_dir: paths.log_dir().ok(),
        diagnostics: diagnostics_tx,
    })?;

    let app = bootstrap::bootstrap(paths, cli.backend_url.clone()).await?;

    match cli.command {
        Commands::Suggest { query } => {
            app.search.on_query_change(&query).await;
            render::print_view(&app.search.view());
        }
        Commands::Search { query, json } => {
            let outcome = app.search.submit(&query).await;
            if json {
                let output = serde_json::json!({
                    "outcome": format!("{:?}", outcome),
                    "navigation": app.navigator.last(),
                    "view": app.search.view(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if !matches!(outcome, DispatchOutcome::Navigated(_)) {
                render::print_view(&app.search.view());
            }
        }
        Commands::Repl { .. } => {
            if let Some(mut rx) = diagnostics_rx {
                tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        render::print_diagnostic(&event);
                    }
                });
            }
            return repl::run(&app).await;
        }
    }

    app.search.unmount().await;
    Ok(())
}
