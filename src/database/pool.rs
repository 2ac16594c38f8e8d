use crate::config::Config;
use crate::error::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = pool_options().connect(&config.database_url).await?;
    Ok(pool)
}

/// Pool that only opens connections on first use.
pub fn create_lazy_pool(config: &Config) -> Result<PgPool> {
    let pool = pool_options().connect_lazy(&config.database_url)?;
    Ok(pool)
}

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(30))
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
