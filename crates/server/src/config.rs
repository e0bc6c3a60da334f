use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use printdesk_push::HttpPushConfig;
use printdesk_store_postgres::PostgresConfig;

use crate::error::ServerError;

fn default_listen() -> String {
    "127.0.0.1:8080".to_owned()
}

fn default_poll_interval_secs() -> u64 {
    30
}

/// Which storage backend to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// In-process only; state is lost on restart. Development and tests.
    Memory,
    /// PostgreSQL with the LISTEN/NOTIFY change feed.
    Postgres,
}

/// Store section of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    pub backend: StoreBackend,
    /// Required when `backend = "postgres"`.
    #[serde(default)]
    pub postgres: Option<PostgresConfig>,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            postgres: None,
        }
    }
}

/// Top-level server configuration, loaded from TOML with environment
/// overrides for deployment-varying values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. `0.0.0.0:8080`.
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default)]
    pub store: StoreSection,

    /// Push delivery settings (timeout, TTL, VAPID material).
    #[serde(default)]
    pub push: HttpPushConfig,

    /// Interval of the realtime bridge's polling fallback, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            store: StoreSection::default(),
            push: HttpPushConfig::default(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file, then apply environment overrides.
    /// A missing path yields the defaults (memory backend).
    pub fn load(path: Option<&Path>) -> Result<Self, ServerError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    ServerError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                toml::from_str(&raw)
                    .map_err(|e| ServerError::Config(format!("invalid config: {e}")))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// `PRINTDESK_LISTEN` and `PRINTDESK_DATABASE_URL` override the file,
    /// so deployments can keep secrets out of it. Setting the database
    /// URL switches the backend to Postgres.
    fn apply_env_overrides(&mut self) {
        if let Ok(listen) = std::env::var("PRINTDESK_LISTEN") {
            self.listen = listen;
        }
        if let Ok(url) = std::env::var("PRINTDESK_DATABASE_URL") {
            self.store.backend = StoreBackend::Postgres;
            match &mut self.store.postgres {
                Some(pg) => pg.url = url,
                None => self.store.postgres = Some(PostgresConfig::new(url)),
            }
        }
    }

    fn validate(&self) -> Result<(), ServerError> {
        if self.store.backend == StoreBackend::Postgres && self.store.postgres.is_none() {
            return Err(ServerError::Config(
                "store.backend is postgres but store.postgres is not configured".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_memory_backend() {
        let config = ServerConfig::default();
        assert_eq!(config.listen, "127.0.0.1:8080");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.poll_interval_secs, 30);
    }

    #[test]
    fn parses_full_toml() {
        let config: ServerConfig = toml::from_str(
            r#"
            listen = "0.0.0.0:9000"
            poll_interval_secs = 10

            [store]
            backend = "postgres"

            [store.postgres]
            url = "postgres://localhost/printdesk"

            [push]
            timeout = 5
            ttl_seconds = 3600
            "#,
        )
        .unwrap();
        assert_eq!(config.listen, "0.0.0.0:9000");
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert_eq!(
            config.store.postgres.clone().unwrap().url,
            "postgres://localhost/printdesk"
        );
        assert_eq!(config.push.timeout, Duration::from_secs(5));
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
    }

    #[test]
    fn postgres_backend_without_settings_is_rejected() {
        let config: ServerConfig = toml::from_str("[store]\nbackend = \"postgres\"").unwrap();
        assert!(config.validate().is_err());
    }
}
