//! StealthMole API client
//!
//! Every call signs a fresh JWT (access key, random nonce, issued-at) with the
//! caller's secret key. Responses are classified into success, authorization
//! failure and provider failure; nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Credentials, SearchResult, ThreatIntelProvider};
use crate::config::Config;
use crate::error::{AppResult, RelayError};
use crate::models::{Module, Observable};

/// Claims of the token presented to the provider
#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderClaims {
    pub access_key: String,
    pub nonce: String,
    pub iat: i64,
}

/// Provider API client
pub struct StealthMoleClient {
    search_url: String,
    auth_url: String,
    http_client: reqwest::Client,
}

impl StealthMoleClient {
    /// Create new client
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            search_url: config.search_url.clone(),
            auth_url: config.auth_url.clone(),
            http_client,
        })
    }

    fn module_url(&self, module_code: &str) -> String {
        self.search_url.replace("{module}", module_code)
    }
}

/// Sign a single-use provider token
pub fn create_token(credentials: &Credentials) -> AppResult<String> {
    let claims = ProviderClaims {
        access_key: credentials.access_key.clone(),
        nonce: Uuid::new_v4().to_string(),
        iat: Utc::now().timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(credentials.secret_key.as_bytes()),
    )
    .map_err(|e| RelayError::StealthMole(format!("Failed to sign provider token: {}", e)))
}

/// Read the body, turning non-200 statuses into relay errors.
async fn read_response(response: reqwest::Response, label: &str) -> AppResult<String> {
    let status = response.status();
    let body = response.text().await?;

    if status == StatusCode::OK {
        return Ok(body);
    }

    let detail = error_detail(&body, status);

    if status == StatusCode::UNAUTHORIZED {
        warn!(label, "Provider rejected credentials");
        return Err(RelayError::Authorization(detail));
    }

    warn!(label, status = status.as_u16(), "Provider request failed");
    Err(RelayError::Observe(format!("{}: {}", label, detail)))
}

fn error_detail(body: &str, status: StatusCode) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    }
}

#[async_trait]
impl ThreatIntelProvider for StealthMoleClient {
    async fn search(
        &self,
        credentials: &Credentials,
        module: &Module,
        observable: &Observable,
    ) -> AppResult<SearchResult> {
        let url = self.module_url(&module.code);
        let token = create_token(credentials)?;

        debug!(module = %module.code, observable_type = %observable.kind, "Querying StealthMole");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .query(&[("query", observable.query().as_str()), ("order", "asc")])
            .send()
            .await?;

        let label = format!("{} Module", module.code.to_uppercase());
        let body = read_response(response, &label).await?;
        let result: SearchResult = serde_json::from_str(&body)?;

        debug!(module = %module.code, total = result.total_count, "StealthMole lookup complete");

        Ok(result)
    }

    async fn authenticate(&self, credentials: &Credentials) -> AppResult<()> {
        let token = create_token(credentials)?;

        let response = self
            .http_client
            .get(&self.auth_url)
            .bearer_auth(token)
            .send()
            .await?;

        read_response(response, "Health Check").await?;
        Ok(())
    }
}
