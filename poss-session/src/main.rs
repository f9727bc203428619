//! poss-session - Possessão assessment service
//!
//! **Module Identity:**
//! - Name: poss-session
//! - Port: 5790 (default)
//!
//! Serves question sets, scores answers against the entity catalog and
//! composes the user's photo with the chosen entity's overlay.

use anyhow::{Context, Result};
use clap::Parser;
use poss_common::catalog::sample_entities;
use poss_common::config::{resolve_removebg_api_key, resolve_root_folder, RootFolder, TomlConfig};
use poss_common::{db, EntityCatalog};
use poss_compositor::placeholder::generate_placeholder_overlays;
use poss_compositor::{DirOverlayStore, ExtractionChain, ImageCompositor, RemoveBgClient};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use poss_session::services::{SessionSweeper, SweeperConfig};
use poss_session::AppState;
use tokio_util::sync::CancellationToken;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "poss-session")]
#[command(about = "Possessão assessment and image composition service")]
#[command(version)]
struct Args {
    /// HTTP server port
    #[arg(short, long, default_value = "5790", env = "POSS_PORT")]
    port: u16,

    /// Root folder for the database, overlays and output
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Write placeholder overlays for every catalog entity into DIR and exit
    #[arg(long, value_name = "DIR")]
    generate_overlays: Option<PathBuf>,

    /// Seconds a session may stay untouched before it is evicted
    #[arg(long, default_value = "3600", env = "POSS_SESSION_TTL_SECS")]
    session_ttl_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "poss_session=debug,poss_compositor=debug,poss_engine=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Possessão Session (poss-session) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let catalog = EntityCatalog::from_seed();

    if let Some(dir) = args.generate_overlays {
        let ids: Vec<&str> = catalog.all().iter().map(|e| e.id.as_str()).collect();
        let written = generate_placeholder_overlays(&dir, &ids)
            .with_context(|| format!("Failed to write overlays to {}", dir.display()))?;
        info!(count = written.len(), dir = %dir.display(), "Placeholder overlays generated");
        return Ok(());
    }

    // Step 1: Resolve root folder (CLI > env > TOML > OS default)
    let toml = TomlConfig::load();
    let root = resolve_root_folder(args.root_folder.as_deref(), &toml);
    let folders = RootFolder::new(root, &toml);
    folders
        .ensure_directories_exist()
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", folders.path().display());

    // Step 2: Open or create database, seed the entity store
    let db_path = folders.database_path();
    info!("Database: {}", db_path.display());
    let pool = db::init_database_pool(&db_path).await?;

    if db::entities::seed_if_empty(&pool).await? {
        info!("Entity store seeded");
    }
    if db::entities::replace_with_sample_if_below(&pool, sample_entities().len() as i64).await? {
        warn!("Entity store was incomplete, replaced with the shipped seed");
    }
    info!(
        stored = db::entities::count(&pool).await?,
        in_memory = catalog.len(),
        "Entity catalog loaded"
    );

    // Step 3: Compositor with the configured extraction chain
    let removebg = RemoveBgClient::from_config(resolve_removebg_api_key(&toml), toml.removebg_endpoint.clone());
    match &removebg {
        Some(client) => info!(endpoint = client.endpoint(), "Remote background removal enabled"),
        None => info!("No Remove.bg API key, using local silhouette extraction only"),
    }
    let compositor = ImageCompositor::new(
        Arc::new(DirOverlayStore::new(folders.overlays_dir())),
        ExtractionChain::with_remote(removebg),
        folders.output_dir(),
    );
    info!(
        overlays = %folders.overlays_dir().display(),
        output = %folders.output_dir().display(),
        "Compositor ready"
    );

    let state = AppState::new(catalog, compositor);

    // Step 4: Evict sessions abandoned by their clients
    let shutdown = CancellationToken::new();
    let sweeper = SessionSweeper::new(
        state.clone(),
        SweeperConfig {
            idle_ttl_secs: args.session_ttl_secs,
            ..SweeperConfig::default()
        },
    )
    .run(shutdown.clone());

    let app = poss_session::build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        warn!("Session sweeper ended abnormally: {}", e);
    }
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
