//! Entity catalog endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use poss_common::EntityDefinition;
use serde::Serialize;

use crate::{
    error::{ApiError, ApiResult},
    AppState,
};

/// GET /entities response
#[derive(Debug, Serialize)]
pub struct EntityListResponse {
    pub count: usize,
    pub entities: Vec<EntityDefinition>,
}

/// GET /entities
pub async fn list_entities(State(state): State<AppState>) -> Json<EntityListResponse> {
    Json(EntityListResponse {
        count: state.catalog.len(),
        entities: state.catalog.all().to_vec(),
    })
}

/// GET /entities/:id
pub async fn get_entity(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
) -> ApiResult<Json<EntityDefinition>> {
    state
        .catalog
        .get(&entity_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Entity not found: {}", entity_id)))
}

pub fn entity_routes() -> Router<AppState> {
    Router::new()
        .route("/entities", get(list_entities))
        .route("/entities/:id", get(get_entity))
}
