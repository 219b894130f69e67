//! Threat-intel provider access

pub mod client;
#[cfg(test)]
pub mod fake;

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppResult;
use crate::models::{Module, Observable};

pub use client::StealthMoleClient;

/// Provider API key pair supplied by the caller on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(access_key: &str, secret_key: &str) -> Self {
        Self {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

// Keep the secret out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

/// Search response body.
///
/// Record fields differ per module, so records stay as raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "totalCount", default)]
    pub total_count: u64,

    #[serde(default)]
    pub data: Vec<Value>,
}

impl SearchResult {
    /// No leaked records for the query.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0 && self.data.is_empty()
    }
}

#[async_trait]
pub trait ThreatIntelProvider: Send + Sync {
    /// Look up one observable in one module.
    async fn search(
        &self,
        credentials: &Credentials,
        module: &Module,
        observable: &Observable,
    ) -> AppResult<SearchResult>;

    /// Confirm the provider accepts the credentials.
    async fn authenticate(&self, credentials: &Credentials) -> AppResult<()>;
}
