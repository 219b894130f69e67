//! Authentication middleware

use axum::{
    extract::{State, Request},
    middleware::Next,
    response::Response,
    http::header::AUTHORIZATION,
};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use base64::{engine::general_purpose::STANDARD, Engine};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::{AppState, RelayError};
use crate::config::AuthScheme;
use crate::provider::Credentials;

pub const NO_AUTH_HEADER: &str = "Authorization header is missing";
pub const WRONG_AUTH_TYPE: &str = "Wrong authorization type";

/// Claims of a bearer credential token
#[derive(Debug, Deserialize)]
pub struct CredentialClaims {
    pub access_key: String,
    pub secret_key: String,
}

/// Middleware: Require provider credentials in the Authorization header
pub async fn require_credentials(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, RelayError> {
    let header = req.headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| RelayError::Authorization(NO_AUTH_HEADER.to_string()))?
        .to_str()
        .map_err(|_| RelayError::Authorization(WRONG_AUTH_TYPE.to_string()))?;

    let credentials = match state.config.auth_scheme {
        AuthScheme::Basic => {
            let token = extract_token(header, "basic")?;
            decode_basic(token)?
        }
        AuthScheme::Bearer => {
            let token = extract_token(header, "bearer")?;
            let secret = state.config.jwt_secret.as_deref().unwrap_or_default();
            decode_bearer(token, secret)?
        }
    };

    tracing::debug!(scheme = ?state.config.auth_scheme, "Credentials extracted");

    // Insert into request extensions
    req.extensions_mut().insert(credentials);

    Ok(next.run(req).await)
}

/// Split `<scheme> <token>`, checking the scheme case-insensitively
fn extract_token<'a>(header: &'a str, expected_scheme: &str) -> Result<&'a str, RelayError> {
    let mut parts = header.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(expected_scheme) => Ok(token),
        _ => Err(RelayError::Authorization(WRONG_AUTH_TYPE.to_string())),
    }
}

/// `base64(access_key:secret_key)`
fn decode_basic(token: &str) -> Result<Credentials, RelayError> {
    let decoded = STANDARD
        .decode(token)
        .map_err(|e| RelayError::Authorization(e.to_string()))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|e| RelayError::Authorization(e.to_string()))?;

    let (access_key, secret_key) = decoded
        .split_once(':')
        .ok_or_else(|| RelayError::Authorization("credentials must be access_key:secret_key".to_string()))?;

    Ok(Credentials::new(access_key, secret_key))
}

/// HS256 token signed with the relay secret, carrying the key pair as claims
fn decode_bearer(token: &str, secret: &str) -> Result<Credentials, RelayError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();

    let token_data = decode::<CredentialClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    let claims = token_data.claims;
    Ok(Credentials {
        access_key: claims.access_key,
        secret_key: claims.secret_key,
    })
}

// Implement FromRequestParts for Credentials
#[axum::async_trait]
impl<S> FromRequestParts<S> for Credentials
where
    S: Send + Sync,
{
    type Rejection = RelayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions
            .get::<Credentials>()
            .cloned()
            .ok_or_else(|| RelayError::Authorization(NO_AUTH_HEADER.to_string()))
    }
}
