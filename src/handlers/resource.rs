// handlers/resource.rs - Collection handlers shared by perfumes and clients
//
// Each operation runs the schema's Repository and maps the outcome onto the
// response envelope. Entity-specific wording comes from the Schema.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::{json, Value};

use crate::database::{Record, Repository, RepositoryError};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::schema::{Document, Schema};
use crate::state::AppState;

/// Request body for create/update. Must be a JSON object.
pub type Payload = Result<Json<Value>, JsonRejection>;

/// GET /<collection> - List every record
pub async fn list(state: &AppState, schema: &Schema) -> ApiResult<Vec<Record>> {
    let records = Repository::new(state.store.as_ref(), schema)
        .find_all()
        .await
        .map_err(|e| failure(schema, "retrieving", schema.plural, e))?;

    let count = records.len();
    Ok(ApiResponse::success(records).with_count(count))
}

/// GET /<collection>/{id} - Fetch one record
pub async fn get(state: &AppState, schema: &Schema, id: &str) -> ApiResult<Record> {
    let record = Repository::new(state.store.as_ref(), schema)
        .find_by_id(id)
        .await
        .map_err(|e| failure(schema, "retrieving", &entity_lower(schema), e))?;

    Ok(ApiResponse::success(record))
}

/// POST /<collection> - Validate and insert a new record
pub async fn create(state: &AppState, schema: &Schema, payload: Payload) -> ApiResult<Record> {
    let input = document(payload)?;
    let record = Repository::new(state.store.as_ref(), schema)
        .create(&input)
        .await
        .map_err(|e| failure(schema, "creating", &entity_lower(schema), e))?;

    tracing::info!(collection = schema.collection, id = %record.id, "Created record");
    Ok(ApiResponse::created(record).with_message(format!("{} created successfully", schema.entity)))
}

/// PUT /<collection>/{id} - Merge the body onto the stored record
pub async fn update(state: &AppState, schema: &Schema, id: &str, payload: Payload) -> ApiResult<Record> {
    let patch = document(payload)?;
    let record = Repository::new(state.store.as_ref(), schema)
        .update(id, &patch)
        .await
        .map_err(|e| failure(schema, "updating", &entity_lower(schema), e))?;

    Ok(ApiResponse::success(record).with_message(format!("{} updated successfully", schema.entity)))
}

/// DELETE /<collection>/{id} - Remove a record
pub async fn delete(state: &AppState, schema: &Schema, id: &str) -> ApiResult<Value> {
    let removed = Repository::new(state.store.as_ref(), schema)
        .delete(id)
        .await
        .map_err(|e| failure(schema, "deleting", &entity_lower(schema), e))?;

    tracing::info!(collection = schema.collection, id = %removed.id, "Deleted record");
    Ok(ApiResponse::success(json!({})).with_message(format!("{} deleted successfully", schema.entity)))
}

fn document(payload: Payload) -> Result<Document, ApiError> {
    let Json(body) = payload?;
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::InvalidJson("Expected a JSON object".to_string())),
    }
}

fn entity_lower(schema: &Schema) -> String {
    schema.entity.to_lowercase()
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Map a gateway outcome to its HTTP form. `target` names what was being
/// worked on in 500 messages ("Error creating client").
fn failure(schema: &Schema, verb: &str, target: &str, err: RepositoryError) -> ApiError {
    match err {
        RepositoryError::Validation(errors) => ApiError::validation_error(errors.messages()),
        RepositoryError::Duplicate { field, .. } => {
            ApiError::bad_request(format!("{} already exists", capitalize(&field)))
        }
        RepositoryError::InvalidId(_) => {
            ApiError::bad_request(format!("Invalid {} ID format", entity_lower(schema)))
        }
        RepositoryError::NotFound => ApiError::not_found(format!("{} not found", schema.entity)),
        RepositoryError::Store(e) => ApiError::internal_server_error(format!("Error {} {}", verb, target), e),
    }
}
