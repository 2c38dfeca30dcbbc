use std::env;

use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret_key: String,
    pub access_ttl_hours: i64,
    pub refresh_ttl_days: i64,
}

impl JwtConfig {
    /// Build a token service from this configuration.
    pub fn token_service(&self) -> auth::TokenService {
        auth::TokenService::with_ttls(
            self.secret_key.as_bytes(),
            Duration::hours(self.access_ttl_hours),
            Duration::days(self.refresh_ttl_days),
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdentityConfig {
    /// Whether a soft-deleted user's username may be claimed by a new user.
    /// Defaults to `false`: a username stays reserved even after deletion.
    pub allow_username_reuse_after_delete: bool,
}

impl Config {
    /// Load configuration from files with environment variable overrides.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__HOST, JWT__SECRET_KEY, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults (local Postgres, 12 h / 7 d token TTLs)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432_i64)?
            .set_default("database.user", "user")?
            .set_default("database.password", "password")?
            .set_default("database.dbname", "default_db")?
            .set_default("database.max_connections", 5_i64)?
            .set_default("database.acquire_timeout_secs", 20_i64)?
            .set_default("database.max_lifetime_secs", 1800_i64)?
            .set_default("jwt.secret_key", "your_default_secret_key")?
            .set_default("jwt.access_ttl_hours", 12_i64)?
            .set_default("jwt.refresh_ttl_days", 7_i64)?
            .set_default("identity.allow_username_reuse_after_delete", false)?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: DATABASE__HOST=db.internal overrides database.host
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    // `Config::load` reads the process environment, so tests that touch it
    // must not run concurrently.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const OVERRIDE_VARS: &[&str] = &["DATABASE__HOST", "DATABASE__PORT", "JWT__SECRET_KEY"];

    fn clear_override_vars() {
        for var in OVERRIDE_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_override_vars();

        let config = Config::load().expect("Failed to load configuration");

        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.dbname, "default_db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.jwt.access_ttl_hours, 12);
        assert_eq!(config.jwt.refresh_ttl_days, 7);
        assert!(!config.identity.allow_username_reuse_after_delete);
    }

    #[test]
    fn test_env_overrides_take_priority() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_override_vars();

        env::set_var("DATABASE__HOST", "db.internal");
        env::set_var("JWT__SECRET_KEY", "override_secret");
        let config = Config::load();
        clear_override_vars();

        let config = config.expect("Failed to load configuration");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.jwt.secret_key, "override_secret");
        // Untouched keys keep their defaults
        assert_eq!(config.database.port, 5432);
    }
}
