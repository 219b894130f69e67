//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::json;

pub type AppResult<T> = Result<T, RelayError>;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    // Missing/bad credentials, or the provider rejected them
    #[error("Authorization failed: {0}")]
    Authorization(String),

    // Provider answered with something other than 200/401
    #[error("{0}")]
    Observe(String),

    // Transport or decoding failure while talking to the provider
    #[error("{0}")]
    StealthMole(String),

    // Request body failed schema validation
    #[error("Invalid JSON payload received. {0}.")]
    InvalidPayload(String),

    #[error("Invalid Health Check")]
    Watchdog,
}

/// Single entry of the `errors` array returned to the platform.
#[derive(Debug, Serialize)]
pub struct ErrorDoc {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl RelayError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::Authorization(_) => "authorization error",
            RelayError::Observe(_) => "observe error",
            RelayError::StealthMole(_) => "stealthmole error",
            RelayError::InvalidPayload(_) => "invalid payload received",
            RelayError::Watchdog => "health check failed",
        }
    }

    /// Severity reported alongside the code. Every relay error aborts the request.
    pub fn kind(&self) -> &'static str {
        "fatal"
    }

    pub fn to_doc(&self) -> ErrorDoc {
        ErrorDoc {
            kind: self.kind(),
            code: self.code(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match &self {
            RelayError::InvalidPayload(_) | RelayError::Watchdog => {
                tracing::warn!(code = self.code(), "{}", self);
            }
            _ => {
                tracing::error!(code = self.code(), "{}", self);
            }
        }

        // The platform inspects the `errors` array, not the status line.
        let body = Json(json!({
            "errors": [self.to_doc()]
        }));

        (StatusCode::OK, body).into_response()
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::StealthMole(err.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::StealthMole(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for RelayError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        RelayError::Authorization(err.to_string())
    }
}
