//! Gateway entry point for the Toothtap game server.
//!
//! Initializes logging, loads configuration, connects the durable
//! store (`PostgreSQL`, or in-memory when no database is configured),
//! builds the session registry, and serves the REST + `WebSocket` API.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use toothtap_db::{PgPlayerStore, PostgresConfig, PostgresPool};
use toothtap_economy::Catalog;
use toothtap_gateway::auth::DevTokenAuth;
use toothtap_gateway::config::GatewayConfig;
use toothtap_gateway::server::start_server;
use toothtap_gateway::state::AppState;
use toothtap_session::store::DurableStore;
use toothtap_session::{MemoryStore, SessionRegistry};

/// Default configuration file path, overridable via `TOOTHTAP_CONFIG`.
const DEFAULT_CONFIG_PATH: &str = "toothtap.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("toothtap-gateway starting");

    let config = load_config()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        max_taps_per_second = config.session.max_taps_per_second,
        messages_per_second = config.limits.messages_per_second,
        "configuration loaded"
    );

    let store: Arc<dyn DurableStore> = match &config.database.url {
        Some(url) => {
            let pg_config = PostgresConfig::new(url)
                .with_max_connections(config.database.max_connections);
            let pool = PostgresPool::connect(&pg_config).await?;
            pool.run_migrations().await?;
            Arc::new(PgPlayerStore::new(&pool))
        }
        None => {
            warn!("no database configured, player progress will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let registry = Arc::new(SessionRegistry::new(
        store,
        Arc::new(Catalog::standard()),
        config.session,
    ));
    let state = Arc::new(AppState::new(
        registry,
        Arc::new(DevTokenAuth),
        config.limits,
    ));

    start_server(&config.server, state).await?;
    Ok(())
}

/// Load configuration from `TOOTHTAP_CONFIG` (or the default path),
/// falling back to defaults when no file exists.
fn load_config() -> anyhow::Result<GatewayConfig> {
    let path = std::env::var("TOOTHTAP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let path = Path::new(&path);
    if path.exists() {
        info!(path = %path.display(), "loading configuration file");
        Ok(GatewayConfig::from_file(path)?)
    } else {
        info!("no configuration file found, using defaults");
        let mut config = GatewayConfig::default();
        config.database.apply_env_overrides();
        Ok(config)
    }
}
