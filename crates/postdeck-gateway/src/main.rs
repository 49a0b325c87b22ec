use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use postdeck_core::config::PostdeckConfig;
use postdeck_posts::PostStore;
use postdeck_scheduler::{SweepEngine, Sweeper};
use tracing::{error, info};

mod app;
mod auth;
mod http;

#[derive(Parser)]
#[command(name = "postdeck-gateway")]
#[command(about = "Post scheduling service: HTTP API plus the due-post sweeper", version)]
struct Cli {
    /// Path to postdeck.toml (falls back to POSTDECK_CONFIG, then ~/.postdeck/postdeck.toml)
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server and the background sweeper (default)
    Serve,

    /// Publish all due posts once, print the report as JSON, and exit
    Sweep,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "postdeck_gateway=info,postdeck_scheduler=info,postdeck_posts=info,tower_http=debug"
                    .into()
            }),
        )
        .init();

    let cli = Cli::parse();

    let config = load_config(cli.config)?;

    let db_path = config.database.path.clone();
    ensure_parent_dir(&db_path);
    info!(path = %db_path, "opening SQLite database");
    let store = PostStore::open(&db_path)
        .with_context(|| format!("failed to open database at {db_path}"))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Sweep => {
            let report = Sweeper::new(store).sweep()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Serve => serve(config, store, &db_path).await,
    }
}

/// Resolve config: --config > POSTDECK_CONFIG env > ~/.postdeck/postdeck.toml.
///
/// A missing file means defaults. A file that is present but fails to parse
/// or validate aborts startup.
fn load_config(cli_path: Option<String>) -> anyhow::Result<PostdeckConfig> {
    let path = cli_path.or_else(|| std::env::var("POSTDECK_CONFIG").ok());
    PostdeckConfig::load(path.as_deref()).context("invalid configuration")
}

async fn serve(config: PostdeckConfig, store: PostStore, db_path: &str) -> anyhow::Result<()> {
    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;
    let sweeper_cfg = config.sweeper.clone();

    let state = Arc::new(app::AppState::new(config, store));

    // Sweep reports: SweepEngine → stats task
    let (reports_tx, mut reports_rx) = tokio::sync::mpsc::channel(64);
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let engine_task = if sweeper_cfg.enabled {
        // engine gets its own connection to the same file
        let engine = SweepEngine::new(
            Sweeper::new(PostStore::open(db_path)?),
            sweeper_cfg.interval_secs,
        )?
        .with_reports(reports_tx);
        Some(tokio::spawn(engine.run(shutdown_rx)))
    } else {
        info!("background sweeper disabled; use /api/publish-scheduled or `postdeck-gateway sweep`");
        drop(reports_tx);
        None
    };

    let stats_state = Arc::clone(&state);
    tokio::spawn(async move {
        while let Some(report) = reports_rx.recv().await {
            stats_state.sweep_stats.record(&report);
        }
    });

    let router = app::build_router(state);
    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("postdeck gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // signal sweeper to stop and wait for an in-flight sweep to finish
    let _ = shutdown_tx.send(true);
    if let Some(task) = engine_task {
        if let Err(e) = task.await {
            error!("sweep engine task failed: {e}");
        }
    }
    info!("postdeck gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {e}");
        // without a signal handler the server runs until killed
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postdeck_core::config::AuthMode;
    use std::io::Write;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn token_mode_without_token_aborts_startup() {
        let file = config_file("[gateway.auth]\nmode = \"token\"\n");
        let path = file.path().to_string_lossy().into_owned();
        let err = load_config(Some(path)).unwrap_err();
        assert!(format!("{err:#}").contains("gateway.auth.token"));
    }

    #[test]
    fn malformed_file_aborts_startup() {
        let file = config_file("[gateway\nport = ");
        let path = file.path().to_string_lossy().into_owned();
        assert!(load_config(Some(path)).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.toml").to_string_lossy().into_owned();
        let config = load_config(Some(path)).expect("defaults");
        assert_eq!(config.gateway.auth.mode, AuthMode::None);
    }

    #[test]
    fn token_config_is_honoured() {
        let file = config_file("[gateway.auth]\nmode = \"token\"\ntoken = \"s3cret\"\n");
        let path = file.path().to_string_lossy().into_owned();
        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.gateway.auth.mode, AuthMode::Token);
        assert_eq!(config.gateway.auth.token.as_deref(), Some("s3cret"));
    }
}
