//! Application error types

use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid upstream format: {0}")]
    InvalidUpstreamFormat(String),

    #[error("Session expired, please retry")]
    SessionExpired,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Tracked symbol list is full")]
    CapacityExceeded,

    #[error("Symbol already tracked: {0}")]
    AlreadyTracked(String),

    #[error("Symbol not tracked: {0}")]
    NotTracked(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Serializable error response for API consumers
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let code = match err {
            AppError::Http(_) => "HTTP_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::InvalidUpstreamFormat(_) => "INVALID_UPSTREAM_FORMAT",
            AppError::SessionExpired => "SESSION_EXPIRED",
            AppError::Upstream(_) => "UPSTREAM_ERROR",
            AppError::UnknownSymbol(_) => "UNKNOWN_SYMBOL",
            AppError::CapacityExceeded => "CAPACITY_EXCEEDED",
            AppError::AlreadyTracked(_) => "ALREADY_TRACKED",
            AppError::NotTracked(_) => "NOT_TRACKED",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
