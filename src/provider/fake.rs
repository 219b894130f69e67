//! In-process provider used by handler and router tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Credentials, SearchResult, ThreatIntelProvider};
use crate::error::{AppResult, RelayError};
use crate::models::{Module, Observable};

/// Canned answers keyed by `(module code, observable value)`; unknown keys are empty.
#[derive(Default)]
pub struct FakeProvider {
    results: HashMap<(String, String), SearchResult>,
    reject_with: Option<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, module: &str, value: &str, body: serde_json::Value) -> Self {
        let result: SearchResult = serde_json::from_value(body).expect("valid search result");
        self.results.insert((module.to_string(), value.to_string()), result);
        self
    }

    /// Every call fails with a provider 401 carrying `detail`.
    pub fn rejecting(mut self, detail: &str) -> Self {
        self.reject_with = Some(detail.to_string());
        self
    }

    /// `(module, query)` pairs seen so far, in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ThreatIntelProvider for FakeProvider {
    async fn search(
        &self,
        _credentials: &Credentials,
        module: &Module,
        observable: &Observable,
    ) -> AppResult<SearchResult> {
        self.calls
            .lock()
            .unwrap()
            .push((module.code.clone(), observable.query()));

        if let Some(detail) = &self.reject_with {
            return Err(RelayError::Authorization(detail.clone()));
        }

        Ok(self
            .results
            .get(&(module.code.clone(), observable.value.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn authenticate(&self, _credentials: &Credentials) -> AppResult<()> {
        match &self.reject_with {
            Some(detail) => Err(RelayError::Authorization(detail.clone())),
            None => Ok(()),
        }
    }
}
