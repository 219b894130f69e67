//! Health, watchdog and version handlers

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::{AppState, AppResult, RelayError};
use crate::handlers::{jsonify_data, DataResponse};
use crate::provider::Credentials;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    version: &'static str,
}

/// Validate the caller's credentials against the provider
pub async fn check(
    State(state): State<AppState>,
    credentials: Credentials,
) -> AppResult<Json<DataResponse<HealthResponse>>> {
    state.provider.authenticate(&credentials).await?;

    Ok(jsonify_data(HealthResponse { status: "ok" }))
}

/// Echo the `Health-Check` header back to the platform's watchdog
pub async fn watchdog(headers: HeaderMap) -> AppResult<Json<DataResponse<String>>> {
    let value = headers
        .get("Health-Check")
        .and_then(|v| v.to_str().ok())
        .ok_or(RelayError::Watchdog)?;

    Ok(jsonify_data(value.to_string()))
}

pub async fn version(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: state.config.version(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn test_watchdog_echoes_header() {
        let mut headers = HeaderMap::new();
        headers.insert("Health-Check", HeaderValue::from_static("ping-42"));

        let Json(body) = watchdog(headers).await.unwrap();
        assert_eq!(body.data, "ping-42");
    }

    #[tokio::test]
    async fn test_watchdog_without_header() {
        let err = watchdog(HeaderMap::new()).await.unwrap_err();
        assert_eq!(err.code(), "health check failed");
        assert_eq!(err.to_string(), "Invalid Health Check");
    }
}
