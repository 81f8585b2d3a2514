use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use parley_config::AppConfig;
use parley_gateway::{create_router, GatewayState};
use parley_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "parley-server")]
#[command(about = "Parley chat backend (serves by default)")]
struct Cli {
    /// Configuration file; overrides PARLEY_CONFIG and the default search paths
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server
    Serve,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config(cli.config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::Migrate => run_migrations(config).await,
    }
}

fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    match explicit {
        Some(path) => parley_config::load_from(Some(path)),
        None => parley_config::load(),
    }
    .context("failed to load configuration")
}

async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    info!("starting Parley backend");

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let state = GatewayState::new(services.db_pool.clone(), &config);
    let app = create_router(state, config.http.static_dir.as_deref());

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(parley_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    services.db_pool.close().await;
    info!("backend shut down");
    Ok(())
}

async fn run_migrations(config: AppConfig) -> anyhow::Result<()> {
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(&services.db_pool)
        .await
        .context("failed to read migration history")?;

    services.db_pool.close().await;
    info!(applied, url = %config.database.url, "database schema is up to date");
    Ok(())
}
