// src/db/mod.rs
// Postgres connection pool and migration runner — the schema owner (spec §2, §6).

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::server::DatabaseConfig;

pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections())
        .min_connections(config.pool_size)
        .max_lifetime(Duration::from_secs(config.recycle_seconds))
        .connect(&config.url)
        .await?;

    Ok(pool)
}

/// Runs pending migrations. The migration set creates the configured schema,
/// all tables in §3, the pgvector extension, and the full-text trigger that
/// maintains `Knowledge.search_vector`.
pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Cheap connectivity probe used by the health/ready handlers.
pub async fn ping(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}
