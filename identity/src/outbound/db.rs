use std::time::Duration;

use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Build the bounded connection pool.
///
/// Capacity, acquire timeout, and connection lifetime are all bounded, and
/// connections are liveness-checked before handout; exhaustion surfaces as
/// an acquire timeout rather than an indefinite hang. The returned pool is
/// the only shared resource in the crate and is handed to the repositories
/// by value (it is internally reference-counted).
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.dbname);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect_with(options)
        .await?;

    tracing::info!(
        host = %config.host,
        dbname = %config.dbname,
        max_connections = config.max_connections,
        "Database connection pool created"
    );

    Ok(pool)
}
