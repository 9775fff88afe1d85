//! # REST API for the Photo Gallery
//!
//! Uploads send the raw image bytes as the request body, the file name in
//! the `name` query parameter and the MIME type in `Content-Type`.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get},
    Router,
};
use log::info;
use serde::Deserialize;

use super::errors::gallery_error_response;
use crate::backend::AppState;

/// Extra room above the policy limit so oversized uploads reach the policy
/// check and get a descriptive error
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub name: Option<String>,
}

/// Create a router for gallery APIs
pub fn router(max_upload_bytes: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_LIMIT_SLACK);
    Router::new()
        .route("/", get(list_photos).post(upload_photo))
        .route("/:id", delete(delete_photo))
        .layer(DefaultBodyLimit::max(body_limit))
}

pub async fn list_photos(State(state): State<AppState>) -> Response {
    info!("GET /api/photos");
    (StatusCode::OK, Json(state.gallery_service.list().await)).into_response()
}

pub async fn upload_photo(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let name = query.name.unwrap_or_else(|| "foto".to_string());
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    info!("POST /api/photos - name: {}, type: {:?}, {} bytes", name, content_type, body.len());

    match state
        .gallery_service
        .upload(&name, content_type, body.to_vec())
        .await
    {
        Ok(uploaded) => (StatusCode::CREATED, Json(uploaded)).into_response(),
        Err(e) => gallery_error_response(e),
    }
}

pub async fn delete_photo(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("DELETE /api/photos/{}", id);

    match state.gallery_service.delete(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => gallery_error_response(e),
    }
}
