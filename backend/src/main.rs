//! Accounts service entry-point: loads settings, prepares storage, and runs
//! the HTTP server.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use rand::RngCore;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use accounts::inbound::http::health::HealthState;
use accounts::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{ServerConfig, ServerSettings, create_server};

const EPHEMERAL_SECRET_LEN: usize = 32;

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

/// Token secret from settings; debug builds fall back to a random one.
fn token_secret(settings: &ServerSettings) -> Result<Zeroizing<Vec<u8>>> {
    if let Some(secret) = settings.token_secret() {
        return Ok(Zeroizing::new(secret.as_bytes().to_vec()));
    }
    if cfg!(debug_assertions) {
        warn!("using ephemeral token secret (dev only); tokens will not survive a restart");
        let mut secret = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
        rand::thread_rng().fill_bytes(secret.as_mut_slice());
        return Ok(secret);
    }
    Err(eyre!("ACCOUNTS_TOKEN_SECRET must be set in release builds"))
}

async fn build_config(settings: &ServerSettings) -> Result<ServerConfig> {
    let config = ServerConfig::new(
        settings.bind_addr()?,
        token_secret(settings)?,
        settings.token_ttl()?,
    );

    let Some(database_url) = settings.database_url() else {
        return Ok(config);
    };

    run_migrations(database_url)
        .await
        .wrap_err("apply database migrations")?;
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections),
    )
    .await
    .wrap_err("build database pool")?;
    info!(max_connections = settings.db_max_connections, "database pool ready");
    Ok(config.with_db_pool(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings =
        ServerSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let config = build_config(&settings).await?;
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, &config)
        .wrap_err_with(|| format!("bind HTTP listener on {bind_addr}"))?;
    info!(%bind_addr, "accounts service listening");
    server.await.wrap_err("HTTP server failed")
}
