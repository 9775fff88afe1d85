//! Translation of domain errors into HTTP responses.
//!
//! Every error body is an `ErrorResponse { error }` JSON object.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::{error, warn};
use shared::ErrorResponse;

use crate::backend::domain::{GalleryError, LaudoError};

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

pub fn laudo_status(e: &LaudoError) -> StatusCode {
    match e {
        LaudoError::DuplicateKey { .. } => StatusCode::CONFLICT,
        LaudoError::RowNotFound { .. } | LaudoError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
        LaudoError::UnknownField { .. } | LaudoError::InvalidRowInput { .. } => StatusCode::BAD_REQUEST,
        LaudoError::NoAdditionalRecord => StatusCode::CONFLICT,
    }
}

pub fn laudo_error_response(e: LaudoError) -> Response {
    let status = laudo_status(&e);
    warn!("Request failed ({}): {}", status, e);
    error_response(status, e.to_string())
}

pub fn gallery_status(e: &GalleryError) -> StatusCode {
    match e {
        GalleryError::UnsupportedType(_) | GalleryError::TooLarge { .. } | GalleryError::Empty => {
            StatusCode::BAD_REQUEST
        }
        GalleryError::NotFound(_) => StatusCode::NOT_FOUND,
        GalleryError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub fn gallery_error_response(e: GalleryError) -> Response {
    let status = gallery_status(&e);
    if status == StatusCode::SERVICE_UNAVAILABLE {
        error!("Photo store failure: {}", e);
    } else {
        warn!("Photo request rejected ({}): {}", status, e);
    }
    error_response(status, e.to_string())
}
