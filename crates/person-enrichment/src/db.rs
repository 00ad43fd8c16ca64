//! Person store bootstrap.

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Schema migrations embedded at build time
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

const STARTUP_RETRY_INTERVAL: Duration = Duration::from_secs(2);

/// Pool settings shared by the server and tests. Requests give up after
/// `acquire_timeout_secs` so an unreachable database fails fast.
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
}

/// Open the process-wide pool, wait for it to answer, and bring the schema up to date
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = pool_options(config).connect_lazy_with(config.connect_options()?);

    wait_until_ready(&pool, Duration::from_secs(config.startup_timeout_secs)).await?;
    info!("Database connection established");

    MIGRATOR.run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}

async fn wait_until_ready(pool: &PgPool, budget: Duration) -> Result<()> {
    let deadline = Instant::now() + budget;

    loop {
        match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => return Ok(()),
            Err(e) if Instant::now() + STARTUP_RETRY_INTERVAL < deadline => {
                warn!("Database not ready, retrying: {}", e);
                tokio::time::sleep(STARTUP_RETRY_INTERVAL).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}
