// handlers/perfumes.rs - /parfums routes
//
// Writes are mounted behind the access guard in the router.

use axum::extract::{Path, State};
use serde_json::Value;

use super::resource::{self, Payload};
use crate::database::Record;
use crate::middleware::ApiResult;
use crate::schema::PERFUME_SCHEMA;
use crate::state::AppState;

/// GET /parfums
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Record>> {
    resource::list(&state, &PERFUME_SCHEMA).await
}

/// GET /parfums/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Record> {
    resource::get(&state, &PERFUME_SCHEMA, &id).await
}

/// POST /parfums
pub async fn create(State(state): State<AppState>, payload: Payload) -> ApiResult<Record> {
    resource::create(&state, &PERFUME_SCHEMA, payload).await
}

/// PUT /parfums/{id}
pub async fn update(State(state): State<AppState>, Path(id): Path<String>, payload: Payload) -> ApiResult<Record> {
    resource::update(&state, &PERFUME_SCHEMA, &id, payload).await
}

/// DELETE /parfums/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    resource::delete(&state, &PERFUME_SCHEMA, &id).await
}
