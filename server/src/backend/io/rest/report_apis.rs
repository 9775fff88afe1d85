//! # REST API for Report Export

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use log::{error, info};

use super::errors::error_response;
use crate::backend::AppState;

/// Settle the workbook and return the rendered report
pub async fn get_report(State(state): State<AppState>) -> Response {
    info!("GET /api/report");

    match state
        .report_service
        .render(&state.workbook_service, &state.gallery_service)
        .await
    {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, state.report_service.content_type())],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to render report: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error rendering report")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::io::rest::test_support::test_router;
    use axum::body::Body;
    use axum::http::Request;
    use shared::ReportSnapshot;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_report_export() -> Result<(), Box<dyn std::error::Error>> {
        let (app, _temp_dir) = test_router().await?;

        let response = app
            .oneshot(Request::builder().uri("/api/report").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/json")
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let snapshot: ReportSnapshot = serde_json::from_slice(&body)?;
        assert!((snapshot.totals.grand - 142399.34).abs() < 0.001);
        assert_eq!(snapshot.herd.head_count, 13);
        assert_eq!(snapshot.prices.rows.len(), 3);
        Ok(())
    }
}
