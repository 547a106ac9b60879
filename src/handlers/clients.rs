// handlers/clients.rs - /clients routes

use axum::extract::{Path, State};
use serde_json::Value;

use super::resource::{self, Payload};
use crate::database::Record;
use crate::middleware::ApiResult;
use crate::schema::CLIENT_SCHEMA;
use crate::state::AppState;

/// GET /clients
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Record>> {
    resource::list(&state, &CLIENT_SCHEMA).await
}

/// GET /clients/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Record> {
    resource::get(&state, &CLIENT_SCHEMA, &id).await
}

/// POST /clients
pub async fn create(State(state): State<AppState>, payload: Payload) -> ApiResult<Record> {
    resource::create(&state, &CLIENT_SCHEMA, payload).await
}

/// PUT /clients/{id}
pub async fn update(State(state): State<AppState>, Path(id): Path<String>, payload: Payload) -> ApiResult<Record> {
    resource::update(&state, &CLIENT_SCHEMA, &id, payload).await
}

/// DELETE /clients/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    resource::delete(&state, &CLIENT_SCHEMA, &id).await
}
