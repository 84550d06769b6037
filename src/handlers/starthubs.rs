//! Starthub HTTP handlers: public reads, authenticated writes.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::http::AppState;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::{SearchParams, SearchResponse, StartHub, StartHubRequest};
use crate::services::image::resolve_image;

const NOT_FOUND: &str = "Starthub not found";
const NOT_OWNER: &str = "Starthub not found or you're not the owner";

/// A path segment that does not even decode is a bad request.
fn path_id(path: Result<Path<String>, PathRejection>) -> Result<Uuid, AppError> {
    let Path(raw) = path.map_err(|_| AppError::Validation("Invalid starthub ID".to_string()))?;
    parse_id(&raw)
}

/// Ids that are not UUIDs cannot exist, so they read as not found.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation("ID is required".to_string()));
    }
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(NOT_FOUND.to_string()))
}

/// Write routes treat an unknown id like a row owned by someone else.
fn owned_id(path: Result<Path<String>, PathRejection>) -> Result<Uuid, AppError> {
    match path_id(path) {
        Err(AppError::NotFound(_)) => Err(AppError::Forbidden(NOT_OWNER.to_string())),
        other => other,
    }
}

fn parse_body(body: Result<Json<StartHubRequest>, JsonRejection>) -> Result<StartHubRequest, AppError> {
    let Json(body) = body.map_err(|_| AppError::Validation("Invalid data in request".to_string()))?;
    body.check()?;
    Ok(body)
}

/// GET /starthubs
pub async fn list_starthubs(State(state): State<AppState>) -> Result<Json<Vec<StartHub>>, AppError> {
    Ok(Json(state.repo().starthubs_list().await?))
}

/// GET /starthubs/search?name=
pub async fn search_starthubs(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Query(params) =
        params.map_err(|_| AppError::Validation("Invalid search parameters".to_string()))?;
    let term = params.name.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(AppError::Validation(
            "Search term 'name' is required.".to_string(),
        ));
    }
    let results = state.repo().starthubs_search_by_name(term).await?;
    Ok(Json(SearchResponse {
        search_term: term.to_string(),
        found: results.len(),
        results,
    }))
}

/// GET /starthubs/:id
pub async fn get_starthub(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<StartHub>, AppError> {
    let id = path_id(id)?;
    state
        .repo()
        .starthub_get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

/// POST /api/starthubs
pub async fn create_starthub(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    body: Result<Json<StartHubRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StartHub>), AppError> {
    let body = parse_body(body)?;
    let categories = body.category_names();
    let image_url = resolve_image(state.images(), &categories).await;

    let created = state
        .repo()
        .starthub_create(claims.sub, &body.fields(image_url), &categories)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/starthubs/:id
///
/// Scalar fields only; categories and image are left as they are.
pub async fn update_starthub(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<StartHubRequest>, JsonRejection>,
) -> Result<Json<StartHub>, AppError> {
    let id = owned_id(id)?;
    let body = parse_body(body)?;
    let updated = state
        .repo()
        .starthub_update(id, claims.sub, &body.fields(None))
        .await?
        .ok_or_else(|| AppError::Forbidden(NOT_OWNER.to_string()))?;
    info!(starthub_id = %id, owner_id = %claims.sub, "starthub updated");
    Ok(Json(updated))
}

/// DELETE /api/starthubs/:id
pub async fn delete_starthub(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = owned_id(id)?;
    if !state.repo().starthub_delete(id, claims.sub).await? {
        return Err(AppError::Forbidden(NOT_OWNER.to_string()));
    }
    info!(starthub_id = %id, owner_id = %claims.sub, "starthub deleted");
    Ok(Json(json!({ "message": "Starthub deleted" })))
}
