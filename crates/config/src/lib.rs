use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "parley.toml",
    "config/parley.toml",
    "../parley.toml",
    "../config/parley.toml",
];

/// Secret used when nothing else is configured. Only suitable for local development.
pub const DEV_JWT_SECRET: &str = "parley-development-secret-change-me";

/// Smallest accepted `realtime.pong_wait_ms`; below this the ping period rounds to zero.
pub const MIN_PONG_WAIT_MS: u64 = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub realtime: RealtimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
    /// Directory served for any path no route matches.
    #[serde(default)]
    pub static_dir: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://parley.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_secret")]
    pub jwt_secret: String,
    #[serde(default = "AuthConfig::default_token_ttl")]
    pub token_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Self::default_secret(),
            token_ttl_seconds: Self::default_token_ttl(),
        }
    }
}

impl AuthConfig {
    fn default_secret() -> String {
        DEV_JWT_SECRET.to_string()
    }

    const fn default_token_ttl() -> u64 {
        86_400
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_seconds)
    }
}

/// Timing and sizing knobs for live chat sessions.
///
/// ```
/// use parley_config::RealtimeConfig;
///
/// let realtime = RealtimeConfig::default();
/// assert_eq!(realtime.pong_wait().as_secs(), 60);
/// assert_eq!(realtime.ping_period().as_secs(), 54);
/// assert_eq!(realtime.max_message_size, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    #[serde(default = "RealtimeConfig::default_pong_wait")]
    pub pong_wait_ms: u64,
    #[serde(default = "RealtimeConfig::default_write_wait")]
    pub write_wait_ms: u64,
    #[serde(default = "RealtimeConfig::default_max_message_size")]
    pub max_message_size: usize,
    #[serde(default = "RealtimeConfig::default_history_limit")]
    pub history_limit: u32,
}

impl RealtimeConfig {
    const fn default_pong_wait() -> u64 {
        60_000
    }

    const fn default_write_wait() -> u64 {
        10_000
    }

    const fn default_max_message_size() -> usize {
        1024
    }

    const fn default_history_limit() -> u32 {
        50
    }

    pub fn pong_wait(&self) -> Duration {
        Duration::from_millis(self.pong_wait_ms)
    }

    pub fn write_wait(&self) -> Duration {
        Duration::from_millis(self.write_wait_ms)
    }

    /// Pings go out slightly before the peer's read window closes.
    pub fn ping_period(&self) -> Duration {
        Duration::from_millis(self.pong_wait_ms.saturating_mul(9) / 10)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            pong_wait_ms: Self::default_pong_wait(),
            write_wait_ms: Self::default_write_wait(),
            max_message_size: Self::default_max_message_size(),
            history_limit: Self::default_history_limit(),
        }
    }
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use parley_config::load;
///
/// std::env::remove_var("PARLEY_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    load_from(std::env::var("PARLEY_CONFIG").ok().map(PathBuf::from))
}

/// Same as [`load`], but with an explicit configuration file taking the place of
/// `PARLEY_CONFIG` and the search path.
pub fn load_from(explicit: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.jwt_secret", defaults.auth.jwt_secret.clone())?
        .set_default(
            "auth.token_ttl_seconds",
            clamp_to_i64(defaults.auth.token_ttl_seconds),
        )?
        .set_default(
            "realtime.pong_wait_ms",
            clamp_to_i64(defaults.realtime.pong_wait_ms),
        )?
        .set_default(
            "realtime.write_wait_ms",
            clamp_to_i64(defaults.realtime.write_wait_ms),
        )?
        .set_default(
            "realtime.max_message_size",
            clamp_to_i64(defaults.realtime.max_message_size as u64),
        )?
        .set_default(
            "realtime.history_limit",
            i64::from(defaults.realtime.history_limit),
        )?;

    let environment_overrides = config::Environment::with_prefix("PARLEY").separator("__");

    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading configuration from explicit path");
        builder = builder.add_source(config::File::from(path));
    } else if let Some(path) = std::env::current_dir().ok().and_then(|cwd| {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists())
    }) {
        debug!(path = %path.display(), "loading configuration file");
        builder = builder.add_source(config::File::from(path));
    } else {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.token_ttl_seconds > i64::MAX as u64 {
        config.auth.token_ttl_seconds = i64::MAX as u64;
    }

    if config.realtime.pong_wait_ms < MIN_PONG_WAIT_MS {
        anyhow::bail!(
            "invalid configuration: realtime.pong_wait_ms must be at least {MIN_PONG_WAIT_MS}"
        );
    }

    debug!(
        http = ?config.http,
        database = ?config.database,
        realtime = ?config.realtime,
        "loaded backend configuration"
    );
    Ok(config)
}
