//! medidir-pd - Profile Directory service
//!
//! Stores personal medical profiles keyed by a human-chosen unique name,
//! each with an optional photo asset, and serves them to the MediDir
//! mobile client over HTTP.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use medidir_pd::assets::AssetStore;
use medidir_pd::{build_router, AppState};

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "medidir-pd", about = "MediDir profile directory service")]
struct Args {
    /// Root folder holding the database and uploaded photos
    #[arg(long)]
    root_folder: Option<String>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 6000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!(
        "Starting MediDir Profile Directory (medidir-pd) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let root_folder = medidir_common::config::resolve_root_folder(args.root_folder.as_deref())?;
    medidir_common::config::ensure_root_folder(&root_folder)?;
    info!("Root folder: {}", root_folder.display());

    let db_path = medidir_common::config::database_path(&root_folder);
    let pool = medidir_common::db::init_database(&db_path).await?;

    let assets = AssetStore::new(medidir_common::config::uploads_dir(&root_folder))?;
    info!("Uploads directory: {}", assets.upload_dir().display());

    let state = AppState::new(pool, assets);
    let app = build_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("medidir-pd listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
