//! # REST API for Totals and Recalculation

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::info;
use shared::RecalculationResponse;

use crate::backend::domain::totals::totals_response;
use crate::backend::AppState;

/// Settle pending edits and run a full recalculation pass
pub async fn recalculate(State(state): State<AppState>) -> Response {
    info!("POST /api/recalculate");

    let report = state.workbook_service.recalculate();
    if !report.rejections.is_empty() {
        info!("Recalculation reported {} rejected price rows", report.rejections.len());
    }
    (
        StatusCode::OK,
        Json(RecalculationResponse {
            totals: report.totals,
            rows_recomputed: report.rows_recomputed,
            rejections: report.rejections,
        }),
    )
        .into_response()
}

/// Aggregate totals as of the last completed pass
pub async fn get_totals(State(state): State<AppState>) -> Response {
    info!("GET /api/totals");

    let totals = state.workbook_service.totals();
    (StatusCode::OK, Json(totals_response(&totals))).into_response()
}
