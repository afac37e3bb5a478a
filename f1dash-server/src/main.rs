//! F1 Dashboard Server
//!
//! Main server application with web UI and REST API

use anyhow::{Context, Result};
use clap::Parser;
use f1dash_core::model::LoadOptions;
use f1dash_core::{SessionKey, SessionProvider, SessionType};
use f1dash_providers::{ArchiveProvider, DemoProvider, SessionPayload};
use f1dash_server::config::{Cli, Command, ExportArgs, ServeArgs};
use f1dash_server::{api, state};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().into_command() {
        Command::Serve(args) => serve(args).await,
        Command::Export(args) => export(args),
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    info!("Starting F1 Dashboard Server");

    let provider = args.build_provider();
    info!(
        "Using {} provider (cache dir {}, {} sessions in memory)",
        provider.name(),
        args.cache_dir().display(),
        args.cache_capacity
    );

    // Create application state
    let state = state::AppState::new(provider, args.cache_capacity);

    // Build the router
    let app = api::create_router(state);

    // Start server
    let addr = args.addr();
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn export(args: ExportArgs) -> Result<()> {
    let session_type: SessionType = args.session.parse()?;
    let key = SessionKey::new(args.year, args.event.clone(), session_type)?;

    let demo = DemoProvider::new();
    let archive = ArchiveProvider::new(args.cache_dir());

    let schedule = demo.event_schedule(key.year())?;
    archive.write_schedule(key.year(), &schedule)?;

    let session = demo.load_session(&key, LoadOptions::laps_and_telemetry())?;
    let path = archive.write_session(&key, &SessionPayload::from(&session), args.compress)?;

    info!("Exported {} to {}", key, path.display());
    Ok(())
}
