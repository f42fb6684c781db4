use axum::http::StatusCode;
use redis::RedisError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Referenced entity not found: {0}")]
    ReferenceNotFound(String),

    #[error("Downstream service unavailable: {0}")]
    DownstreamUnavailable(String),

    #[error("Redis pool error: {0}")]
    RedisPoolError(String),

    #[error("Redis command error: {0}")]
    RedisCommandError(#[from] RedisError),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Env error: {0}")]
    EnvError(String),

    #[error("Internal server error")]
    InternalError,
}

impl AppError {
    /// Validation failure for a single named field.
    pub fn validation(field: &str, message: &str) -> Self {
        AppError::Validation(format!("{field}: {message}"))
    }

    pub fn to_response(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::ReferenceNotFound(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::DownstreamUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::RedisPoolError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.clone()),
            AppError::RedisCommandError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Serialization(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Deserialization(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::EnvError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected server error".into(),
            ),
        }
    }
}
