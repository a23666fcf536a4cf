//! Postgres connection pool for the repository layer.
//!
//! All repositories borrow clones of one `PgPool`; the pool is created
//! once at startup and its settings come from the API configuration.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

/// Pool sizing and timeout settings.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

/// Connects to Postgres and verifies the connection is usable before
/// returning the pool.
pub async fn create_pool(settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(settings.idle_timeout)
        .test_before_acquire(true)
        .connect(&settings.url)
        .await?;

    info!(
        max_connections = settings.max_connections,
        "Database pool ready"
    );
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_sane() {
        let settings = PoolSettings::default();
        assert!(settings.max_connections >= settings.min_connections);
        assert!(settings.acquire_timeout < settings.idle_timeout);
    }
}
