//! Deliberation handler: Clean/Malicious verdict per observable

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::{AppState, AppResult};
use crate::handlers::{jsonify_data, DataResponse};
use crate::middleware::payload::ObservablesPayload;
use crate::models::{normalize, Disposition, Docs, Observable, Verdict};
use crate::provider::Credentials;

#[derive(Debug, Serialize)]
pub struct Verdicts {
    pub verdicts: Docs<Verdict>,
}

pub async fn deliberate(
    State(state): State<AppState>,
    credentials: Credentials,
    ObservablesPayload(observables): ObservablesPayload,
) -> AppResult<Json<DataResponse<Verdicts>>> {
    let verdicts = deliberate_observables(&state, &credentials, observables).await?;

    Ok(jsonify_data(Verdicts {
        verdicts: verdicts.into(),
    }))
}

/// Malicious as soon as one module reports records, Clean otherwise
pub async fn deliberate_observables(
    state: &AppState,
    credentials: &Credentials,
    observables: Vec<Observable>,
) -> AppResult<Vec<Verdict>> {
    let observables = normalize(observables, &state.config.observable_types);
    let start_time = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut verdicts = Vec::with_capacity(observables.len());

    for observable in observables {
        let mut disposition = Disposition::Clean;

        for module in state.config.modules_for(&observable.kind) {
            let result = state.provider.search(credentials, module, &observable).await?;
            if !result.is_empty() {
                disposition = Disposition::Malicious;
                break;
            }
        }

        tracing::debug!(observable_type = %observable.kind, verdict = disposition.name(), "Deliberated");
        verdicts.push(Verdict::new(observable, disposition, start_time.clone()));
    }

    Ok(verdicts)
}
