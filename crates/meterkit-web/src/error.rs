//! Web-layer errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use meterkit_core::MeterError;

pub type Result<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Meter(#[from] MeterError),
    #[error("config: {0}")]
    Config(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// Deliberate failure status from a handler.
    #[error("request failed with {0}")]
    Status(StatusCode),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Status(code) => *code,
            WebError::Meter(_) | WebError::Config(_) | WebError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            WebError::Meter(e) => e.code().as_str().to_string(),
            WebError::Config(_) | WebError::Io(_) => "INTERNAL".to_string(),
            WebError::Status(code) => code.canonical_reason().unwrap_or("error").to_string(),
        };
        (status, body).into_response()
    }
}
