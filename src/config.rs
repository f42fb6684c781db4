use std::str::FromStr;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Redis,
    Remote,
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "redis" => Ok(StorageBackend::Redis),
            "remote" => Ok(StorageBackend::Remote),
            other => Err(AppError::EnvError(format!(
                "Unknown STORAGE_BACKEND '{other}', expected postgres, redis or remote"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub persistence_service_url: Option<String>,
    pub recommendation_service_url: String,
    pub reference_checks_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3001);

        let storage_backend = std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse::<StorageBackend>()?;

        let database_url = std::env::var("DATABASE_URL").ok();
        let redis_url = std::env::var("REDIS_URL").ok();
        let persistence_service_url = std::env::var("PERSISTENCE_SERVICE_URL").ok();

        let recommendation_service_url = std::env::var("RECOMMENDATION_SERVICE_URL")
            .map_err(|_| AppError::EnvError("RECOMMENDATION_SERVICE_URL must be set".into()))?;

        let reference_checks_enabled = std::env::var("REFERENCE_CHECKS_ENABLED")
            .map(|s| s == "true" || s == "1")
            .unwrap_or(false);

        let config = Config {
            port,
            storage_backend,
            database_url,
            redis_url,
            persistence_service_url,
            recommendation_service_url,
            reference_checks_enabled,
        };
        config.check()?;

        Ok(config)
    }

    // Which variables are required depends on the selected backend.
    fn check(&self) -> Result<(), AppError> {
        match self.storage_backend {
            StorageBackend::Postgres if self.database_url.is_none() => Err(AppError::EnvError(
                "DATABASE_URL must be set for the postgres backend".into(),
            )),
            StorageBackend::Redis if self.redis_url.is_none() => Err(AppError::EnvError(
                "REDIS_URL must be set for the redis backend".into(),
            )),
            StorageBackend::Remote if self.persistence_service_url.is_none() => {
                Err(AppError::EnvError(
                    "PERSISTENCE_SERVICE_URL must be set for the remote backend".into(),
                ))
            }
            _ if self.reference_checks_enabled && self.persistence_service_url.is_none() => {
                Err(AppError::EnvError(
                    "PERSISTENCE_SERVICE_URL must be set when REFERENCE_CHECKS_ENABLED is true"
                        .into(),
                ))
            }
            _ => Ok(()),
        }
    }
}
