//! Enrichment handlers (observe, refer)

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppState, AppResult};
use crate::handlers::{jsonify_data, DataResponse};
use crate::mapping::map_result;
use crate::middleware::payload::ObservablesPayload;
use crate::models::{normalize, Bundle, Observable};
use crate::provider::Credentials;

/// External link offered by the refer endpoint
#[derive(Debug, Serialize)]
pub struct Reference {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub categories: Vec<&'static str>,
    pub url: String,
}

/// Query every supporting module for every observable and collect the CTIM bundle
pub async fn observe(
    State(state): State<AppState>,
    credentials: Credentials,
    ObservablesPayload(observables): ObservablesPayload,
) -> AppResult<Json<DataResponse<Bundle>>> {
    let bundle = enrich_observables(&state, &credentials, observables).await?;

    tracing::info!(
        indicators = bundle.indicators().len(),
        sightings = bundle.sightings().len(),
        relationships = bundle.relationships().len(),
        "Observe finished"
    );

    Ok(jsonify_data(bundle))
}

pub async fn enrich_observables(
    state: &AppState,
    credentials: &Credentials,
    observables: Vec<Observable>,
) -> AppResult<Bundle> {
    let observables = normalize(observables, &state.config.observable_types);
    let mut bundle = Bundle::new();

    for observable in &observables {
        for module in state.config.modules_for(&observable.kind) {
            let result = state.provider.search(credentials, module, observable).await?;

            if let Some(mapped) = map_result(module, observable, &result, state.ids.as_ref()) {
                bundle = mapped.into_bundle(bundle);
            }
        }
    }

    Ok(bundle)
}

/// Static pivot link to the StealthMole platform
pub async fn refer(State(state): State<AppState>) -> Json<DataResponse<Vec<Reference>>> {
    jsonify_data(vec![Reference {
        id: "ref-stealthmole-search",
        title: "Search for this observable",
        description: "Search this observable in StealthMole",
        categories: vec!["StealthMole", "Search"],
        url: state.config.refer_url.clone(),
    }])
}
