//! HTTP handlers

pub mod health;
pub mod enrich;
pub mod deliberate;

use axum::Json;
use serde::Serialize;

/// `{ "data": ... }` envelope shared by every successful relay response
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

pub fn jsonify_data<T: Serialize>(data: T) -> Json<DataResponse<T>> {
    Json(DataResponse { data })
}
