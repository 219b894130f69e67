//! Observable list extractor

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};

use crate::RelayError;
use crate::models::{parse_observables, Observable};

/// Validated request body. Rejections happen before any provider call.
#[derive(Debug)]
pub struct ObservablesPayload(pub Vec<Observable>);

#[axum::async_trait]
impl<S> FromRequest<S> for ObservablesPayload
where
    S: Send + Sync,
{
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| RelayError::InvalidPayload(e.to_string()))?;

        parse_observables(&body).map(ObservablesPayload)
    }
}
