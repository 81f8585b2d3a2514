use anyhow::{Context, Result};
use parley_config::AppConfig;
use parley_database::{initialize_database, SqlitePool};
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// Fallback filter when `RUST_LOG` is unset.
    pub const DEFAULT_FILTER: &str = "info";

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .with_target(true)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Process-wide resources shared by the HTTP surface and maintenance commands.
#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
}

impl BackendServices {
    /// Open the database (creating the file and parent directory when needed)
    /// and bring its schema up to date.
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        if config.auth.uses_dev_secret() {
            warn!("auth.jwt_secret is the built-in development secret; set PARLEY__AUTH__JWT_SECRET");
        }

        let db_pool = initialize_database(&config.database)
            .await
            .with_context(|| format!("failed to open database at {}", config.database.url))?;

        info!(url = %config.database.url, "database ready");
        Ok(Self { db_pool })
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(?error, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(?error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
