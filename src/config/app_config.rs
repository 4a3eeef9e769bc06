use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::storage::{PostgresConfig, StorageConfig, StorageType};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Storage backend settings
///
/// When `backend` is unset, a configured `url` selects postgres and its
/// absence selects the in-memory store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: Option<String>,
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: None,
            url: None,
            max_connections: 10,
        }
    }
}

impl StorageSettings {
    pub fn storage_type(&self) -> Result<StorageType, DomainError> {
        match (&self.backend, &self.url) {
            (Some(backend), _) => backend.parse(),
            (None, Some(_)) => Ok(StorageType::Postgres),
            (None, None) => Ok(StorageType::InMemory),
        }
    }

    pub fn to_storage_config(&self) -> Result<StorageConfig, DomainError> {
        match self.storage_type()? {
            StorageType::InMemory => Ok(StorageConfig::in_memory()),
            StorageType::Postgres => {
                let url = self.url.as_ref().ok_or_else(|| {
                    DomainError::configuration(
                        "Postgres storage requires storage.url or DATABASE_URL",
                    )
                })?;

                Ok(StorageConfig::postgres(
                    PostgresConfig::new(url).with_max_connections(self.max_connections),
                ))
            }
        }
    }
}

impl AppConfig {
    /// Load configuration from files and the environment, falling back to
    /// defaults when it cannot be parsed
    ///
    /// Precedence, lowest first: `config/default`, `config/local`, `APP__*`
    /// variables, then the plain `PORT` and `DATABASE_URL` variables.
    ///
    /// The parse error is returned next to the defaults so the caller can log
    /// it. There is no fallback when a storage URL or backend is set in the
    /// environment: defaults would quietly switch to the in-memory store.
    pub fn load_or_default() -> Result<(Self, Option<config::ConfigError>), config::ConfigError> {
        let storage_in_env = ["APP__STORAGE__URL", "APP__STORAGE__BACKEND"]
            .iter()
            .any(|name| std::env::var_os(name).is_some());

        Self::load_or_default_with_overrides(
            std::env::var("PORT").ok(),
            std::env::var("DATABASE_URL").ok(),
            storage_in_env,
        )
    }

    fn load_or_default_with_overrides(
        port: Option<String>,
        database_url: Option<String>,
        storage_in_env: bool,
    ) -> Result<(Self, Option<config::ConfigError>), config::ConfigError> {
        let storage_configured = storage_in_env || database_url.is_some();

        match Self::load_with_overrides(port, database_url) {
            Ok(config) => Ok((config, None)),
            Err(e) if storage_configured => Err(e),
            Err(e) => Ok((Self::default(), Some(e))),
        }
    }

    fn load_with_overrides(
        port: Option<String>,
        database_url: Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", port)?
            .set_override_option("storage.url", database_url)?
            .build()?;

        config.try_deserialize()
    }
}
