//! # REST API for Producer and Property Records
//!
//! Each list has a permanent base record. `POST` appends an additional
//! record, `DELETE` removes the last one and `PUT /:index` replaces a record.
//! Validation problems come back as warnings; they never block a write.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use log::info;
use shared::{ProducerRecord, PropertyRecord, RecordIndexResponse};

use super::errors::laudo_error_response;
use crate::backend::AppState;

/// Create a router for producer APIs
pub fn producer_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_producers).post(add_producer).delete(remove_last_producer))
        .route("/:index", put(update_producer))
}

/// Create a router for property APIs
pub fn property_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_properties).post(add_property).delete(remove_last_property))
        .route("/:index", put(update_property))
}

pub async fn list_producers(State(state): State<AppState>) -> Response {
    info!("GET /api/producers");
    (StatusCode::OK, Json(state.workbook_service.producers())).into_response()
}

pub async fn add_producer(State(state): State<AppState>, Json(record): Json<ProducerRecord>) -> Response {
    info!("POST /api/producers - request: {:?}", record);

    let (index, warnings) = state.workbook_service.add_producer(record);
    (StatusCode::CREATED, Json(RecordIndexResponse { index, warnings })).into_response()
}

pub async fn update_producer(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(record): Json<ProducerRecord>,
) -> Response {
    info!("PUT /api/producers/{} - request: {:?}", index, record);

    match state.workbook_service.update_producer(index, record) {
        Ok(warnings) => (StatusCode::OK, Json(RecordIndexResponse { index, warnings })).into_response(),
        Err(e) => laudo_error_response(e),
    }
}

pub async fn remove_last_producer(State(state): State<AppState>) -> Response {
    info!("DELETE /api/producers");

    match state.workbook_service.remove_last_producer() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => laudo_error_response(e),
    }
}

pub async fn list_properties(State(state): State<AppState>) -> Response {
    info!("GET /api/properties");
    (StatusCode::OK, Json(state.workbook_service.properties())).into_response()
}

pub async fn add_property(State(state): State<AppState>, Json(record): Json<PropertyRecord>) -> Response {
    info!("POST /api/properties - request: {:?}", record);

    let (index, warnings) = state.workbook_service.add_property(record);
    (StatusCode::CREATED, Json(RecordIndexResponse { index, warnings })).into_response()
}

pub async fn update_property(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(record): Json<PropertyRecord>,
) -> Response {
    info!("PUT /api/properties/{} - request: {:?}", index, record);

    match state.workbook_service.update_property(index, record) {
        Ok(warnings) => (StatusCode::OK, Json(RecordIndexResponse { index, warnings })).into_response(),
        Err(e) => laudo_error_response(e),
    }
}

pub async fn remove_last_property(State(state): State<AppState>) -> Response {
    info!("DELETE /api/properties");

    match state.workbook_service.remove_last_property() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => laudo_error_response(e),
    }
}
