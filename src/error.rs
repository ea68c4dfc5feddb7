use std::net::AddrParseError;
use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Body returned by the proxy for every failure, whatever the cause.
pub const PROXY_FAILURE_MESSAGE: &str = "Failed to connect to AI Brain";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("malformed history value: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine data directory")]
    NoDataDir,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid duration for {key}: {source}")]
    Duration {
        key: &'static str,
        source: humantime::DurationError,
    },

    #[error("invalid bind address '{value}': {source}")]
    Bind {
        value: String,
        source: AddrParseError,
    },
}

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("request body is not json: {0}")]
    Body(serde_json::Error),

    #[error("webhook reply is not json: {0}")]
    Reply(serde_json::Error),

    #[error("webhook request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error!("Proxy error: {self}");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": PROXY_FAILURE_MESSAGE })),
        )
            .into_response()
    }
}
