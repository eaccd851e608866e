//! Backend entry-point: loads settings, wires storage, and serves HTTP.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use retire_strong_backend::inbound::http::health::HealthState;
use retire_strong_backend::outbound::persistence::{DbPool, PoolConfig};
use server::{ServerConfig, ServerSettings, SessionToggles, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        ServerSettings::load().map_err(|err| eyre!("failed to load server settings: {err}"))?;
    let toggles = SessionToggles::from_env(&DefaultEnv::new())?;
    let key = settings.session_key(toggles)?;
    let same_site = settings.same_site(toggles)?;
    let bind_addr = settings.bind_addr()?;

    let mut config = ServerConfig::new(key, toggles.cookie_secure, same_site, bind_addr);
    if let Some(url) = settings.database_url.as_deref() {
        let mut pool_config = PoolConfig::new(url);
        if let Some(max_size) = settings.pool_max_size {
            pool_config = pool_config.with_max_size(max_size);
        }
        let pool = DbPool::new(pool_config)
            .await
            .map_err(|err| eyre!("failed to build database pool: {}", err.message()))?;
        config = config.with_db_pool(pool);
    } else {
        warn!("no database configured; data lives in memory until shutdown");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("failed to start server")?;
    info!(%bind_addr, "listening");
    server.await.wrap_err("server terminated with an error")
}
