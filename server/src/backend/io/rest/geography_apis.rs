//! # REST API for States and Municipalities
//!
//! Answers `503` with `{"status": "unavailable"}` when every source in the
//! fallback chain failed.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::info;
use serde::Serialize;
use shared::GeographyListing;

use crate::backend::AppState;

/// Create a router for geography APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/states", get(list_states))
        .route("/states/:code/municipalities", get(list_municipalities))
}

fn listing_response<T: Serialize>(listing: GeographyListing<T>) -> Response {
    let status = if listing.is_available() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(listing)).into_response()
}

pub async fn list_states(State(state): State<AppState>) -> Response {
    info!("GET /api/geography/states");
    listing_response(state.geography_service.list_states().await)
}

pub async fn list_municipalities(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    info!("GET /api/geography/states/{}/municipalities", code);
    listing_response(state.geography_service.list_municipalities(&code).await)
}
