//! Apply pending database migrations.
//!
//! Reads the connection string from `RETIRE_STRONG_DATABASE_URL` (or the
//! first argument) and runs the migrations embedded at build time.

use color_eyre::eyre::{Result, WrapErr, eyre};
use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
const DATABASE_URL_ENV: &str = "RETIRE_STRONG_DATABASE_URL";

fn main() -> Result<()> {
    color_eyre::install()?;
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .try_init()
        .map_err(|err| eyre!("tracing init failed: {err}"))?;

    let url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(DATABASE_URL_ENV).ok())
        .ok_or_else(|| eyre!("set {DATABASE_URL_ENV} or pass the database URL"))?;

    let mut conn = PgConnection::establish(&url).wrap_err("failed to connect to the database")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| eyre!("migration failed: {err}"))?;
    for version in &applied {
        info!(%version, "applied migration");
    }
    info!(count = applied.len(), "database is up to date");
    Ok(())
}
