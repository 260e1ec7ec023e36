//! HTTP presentation layer: the dashboard page and its JSON/CSV API

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use handlers::DashboardParams;
pub use routes::create_router;
pub use state::{AppState, DynProvider};

use crate::yahoo_finance::{DownloaderConfig, YahooFinanceClient, DEFAULT_BASE_URL};
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Server host address (default: "127.0.0.1")
    pub host: String,
    /// Server port (default: 3000)
    pub port: u16,
    /// Price download settings
    pub downloader: DownloaderConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            downloader: DownloaderConfig::default(),
        }
    }
}

fn env_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, "ignoring unparsable setting");
            default
        }),
        None => default,
    }
}

impl ServerConfig {
    /// Creates a new server configuration with default download settings
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ServerConfig {
            host: host.into(),
            port,
            downloader: DownloaderConfig::default(),
        }
    }

    /// Reads `HOST`, `PORT`, `YAHOO_BASE_URL`, `DOWNLOAD_TIMEOUT_SECS` and
    /// `DOWNLOAD_MAX_RETRIES`, keeping defaults for unset or invalid values.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ServerConfig::default();

        ServerConfig {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: env_or(&lookup, "PORT", defaults.port),
            downloader: DownloaderConfig {
                base_url: lookup("YAHOO_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                timeout_seconds: env_or(&lookup, "DOWNLOAD_TIMEOUT_SECS", defaults.downloader.timeout_seconds),
                max_retries: env_or(&lookup, "DOWNLOAD_MAX_RETRIES", defaults.downloader.max_retries),
                ..defaults.downloader
            },
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Installs the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Runs the dashboard server against Yahoo Finance
///
/// # Arguments
/// * `config` - Server configuration
///
/// # Returns
/// Returns an error if the server fails to start or encounters a fatal error
///
/// # Example
/// ```rust,no_run
/// use stock_dashboard::server::{init_tracing, run_server, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     init_tracing();
///     run_server(ServerConfig::default()).await?;
///     Ok(())
/// }
/// ```
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let provider = YahooFinanceClient::with_config(config.downloader.clone())?;
    tracing::info!(
        base_url = %provider.config().base_url,
        max_retries = provider.config().max_retries,
        "price provider ready"
    );
    let state = Arc::new(AppState::new(provider));
    let app = create_router(state);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
