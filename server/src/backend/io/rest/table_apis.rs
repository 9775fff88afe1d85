//! # REST API for Workbook Tables
//!
//! Row lifecycle for every table kind (`prices`, `agricultural`, `beef`,
//! `dairy`, `diverse-crop`, `historical`, `herd`, `assets`). Edits answer
//! `202 Accepted` right away; the recompute they trigger settles after the
//! debounce window.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use log::info;
use shared::{
    AddRowResponse, EditAcceptedResponse, FieldEditRequest, RecalculationResponse, RowId, RowInput,
    TableKind,
};

use super::errors::{error_response, laudo_error_response};
use crate::backend::AppState;

/// Create a router for table related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:kind", get(get_table))
        .route("/:kind/rows", post(add_row))
        .route("/:kind/rows/:id", patch(edit_row).delete(remove_row))
}

fn parse_kind(raw: &str) -> Result<TableKind, Response> {
    raw.parse::<TableKind>()
        .map_err(|e| error_response(StatusCode::NOT_FOUND, e))
}

fn parse_row_id(raw: &str) -> Result<RowId, Response> {
    raw.parse::<RowId>()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e))
}

/// Get a table with its computed outputs and subtotal
pub async fn get_table(State(state): State<AppState>, Path(kind): Path<String>) -> Response {
    info!("GET /api/tables/{}", kind);

    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    (StatusCode::OK, Json(state.workbook_service.table_view(kind))).into_response()
}

/// Add a row; the body is optional and holds the row's initial fields
pub async fn add_row(State(state): State<AppState>, Path(kind): Path<String>, body: Bytes) -> Response {
    info!("POST /api/tables/{}/rows - {} bytes", kind, body.len());

    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    let input = if body.iter().all(|b| b.is_ascii_whitespace()) {
        RowInput::empty(kind)
    } else {
        match serde_json::from_slice::<serde_json::Value>(&body)
            .and_then(|value| RowInput::from_json(kind, value))
        {
            Ok(input) => input,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, format!("Invalid {} row: {}", kind, e));
            }
        }
    };

    match state.workbook_service.add_row(input) {
        Ok(added) => (
            StatusCode::CREATED,
            Json(AddRowResponse {
                kind,
                row_id: added.id,
            }),
        )
            .into_response(),
        Err(e) => laudo_error_response(e),
    }
}

/// Apply a raw field edit to a row
pub async fn edit_row(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    Json(request): Json<FieldEditRequest>,
) -> Response {
    info!("PATCH /api/tables/{}/rows/{} - request: {:?}", kind, id, request);

    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let id = match parse_row_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state
        .workbook_service
        .edit_field(kind, id, &request.field, &request.value)
    {
        Ok(receipt) => (
            StatusCode::ACCEPTED,
            Json(EditAcceptedResponse {
                row_id: id,
                pending: true,
                warning: receipt.warning,
            }),
        )
            .into_response(),
        Err(e) => laudo_error_response(e),
    }
}

/// Remove a row and recalculate
pub async fn remove_row(State(state): State<AppState>, Path((kind, id)): Path<(String, String)>) -> Response {
    info!("DELETE /api/tables/{}/rows/{}", kind, id);

    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let id = match parse_row_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.workbook_service.remove_row(kind, id) {
        Ok(report) => (
            StatusCode::OK,
            Json(RecalculationResponse {
                totals: report.totals,
                rows_recomputed: report.rows_recomputed,
                rejections: report.rejections,
            }),
        )
            .into_response(),
        Err(e) => laudo_error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::io::rest::test_support::test_router;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use shared::{AnyTableView, DiverseCropRowInput, RecalculationResponse, TableView, TotalsResponse};
    use tower::ServiceExt;

    fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_price_table() -> Result<(), Box<dyn std::error::Error>> {
        let (app, _temp_dir) = test_router().await?;

        let response = app
            .oneshot(Request::builder().uri("/api/tables/prices").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let view: AnyTableView = serde_json::from_slice(&body)?;
        match view {
            AnyTableView::Prices(prices) => {
                assert_eq!(prices.rows.len(), 3);
                assert_eq!(prices.registered_keys, 3);
            }
            other => panic!("expected price table, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_table_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
        let (app, _temp_dir) = test_router().await?;

        let response = app
            .oneshot(Request::builder().uri("/api/tables/poultry").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_duplicate_price_conflicts() -> Result<(), Box<dyn std::error::Error>> {
        let (app, _temp_dir) = test_router().await?;

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/tables/prices/rows",
                r#"{"key": "milho", "value": 10.0}"#,
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let error: shared::ErrorResponse = serde_json::from_slice(&body)?;
        assert!(error.error.contains("MILHO"));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_empty_row_without_body() -> Result<(), Box<dyn std::error::Error>> {
        let (app, _temp_dir) = test_router().await?;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/tables/diverse-crop/rows")
                    .method(Method::POST)
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let added: AddRowResponse = serde_json::from_slice(&body)?;
        assert_eq!(added.kind, TableKind::DiverseCrop);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_row_truncates_fractional_count() -> Result<(), Box<dyn std::error::Error>> {
        let (app, _temp_dir) = test_router().await?;

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/tables/diverse-crop/rows",
                r#"{"period": "2025", "activity_key": "MILHO", "whole_count": 12.8, "yield_per_unit": 1.0}"#,
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(Request::builder().uri("/api/tables/diverse-crop").body(Body::empty())?)
            .await?;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let table: TableView<DiverseCropRowInput> = serde_json::from_slice(&body)?;
        assert_eq!(table.kind, TableKind::DiverseCrop);
        assert_eq!(table.rows[0].input.whole_count, 12);
        // 12 × 1.0 × 63
        assert!((table.subtotal - 756.0).abs() < 0.001);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_row_body_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let (app, _temp_dir) = test_router().await?;

        let response = app
            .oneshot(json_request(Method::POST, "/api/tables/beef/rows", r#"{"head_count": "#))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_then_recalculate() -> Result<(), Box<dyn std::error::Error>> {
        let (app, _temp_dir) = test_router().await?;

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/tables/agricultural/rows",
                r#"{"period": "2025 / 2026", "activity_key": "MILHO", "area": 10.0, "yield_per_area": 2.0}"#,
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let added: AddRowResponse = serde_json::from_slice(&body)?;

        let response = app
            .clone()
            .oneshot(json_request(
                Method::PATCH,
                &format!("/api/tables/agricultural/rows/{}", added.row_id),
                r#"{"field": "area", "value": "20"}"#,
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let accepted: EditAcceptedResponse = serde_json::from_slice(&body)?;
        assert!(accepted.pending);
        assert_eq!(accepted.row_id, added.row_id);
        assert!(accepted.warning.is_none());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/recalculate")
                    .method(Method::POST)
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let recalculated: RecalculationResponse = serde_json::from_slice(&body)?;
        // Seeded 79869.60 plus 20 ha × 2 × 63
        assert!((recalculated.totals.agricultural - 82389.60).abs() < 0.001);
        assert!(recalculated.rejections.is_empty());

        let response = app
            .oneshot(Request::builder().uri("/api/totals").body(Body::empty())?)
            .await?;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let totals: TotalsResponse = serde_json::from_slice(&body)?;
        assert_eq!(totals.formatted.agricultural, "R$ 82.389,60");
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_unknown_row_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
        let (app, _temp_dir) = test_router().await?;

        let response = app
            .oneshot(json_request(
                Method::PATCH,
                &format!("/api/tables/beef/rows/{}", RowId::new()),
                r#"{"field": "head_count", "value": "5"}"#,
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_unknown_field_is_bad_request() -> Result<(), Box<dyn std::error::Error>> {
        let (app, _temp_dir) = test_router().await?;

        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/tables/beef/rows", "{}"))
            .await?;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let added: AddRowResponse = serde_json::from_slice(&body)?;

        let response = app
            .oneshot(json_request(
                Method::PATCH,
                &format!("/api/tables/beef/rows/{}", added.row_id),
                r#"{"field": "horns", "value": "2"}"#,
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_row_recalculates() -> Result<(), Box<dyn std::error::Error>> {
        let (app, _temp_dir) = test_router().await?;

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/tables/agricultural/rows",
                r#"{"activity_key": "MILHO", "area": 1.0, "yield_per_area": 1.0}"#,
            ))
            .await?;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let added: AddRowResponse = serde_json::from_slice(&body)?;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/tables/agricultural/rows/{}", added.row_id))
                    .method(Method::DELETE)
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let report: RecalculationResponse = serde_json::from_slice(&body)?;
        assert!((report.totals.agricultural - 79869.60).abs() < 0.001);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/tables/agricultural/rows/{}", added.row_id))
                    .method(Method::DELETE)
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
