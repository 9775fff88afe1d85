use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use laudo_server::backend::{create_router, initialize_backend};
use laudo_server::config::LaudoConfig;
use serde::de::DeserializeOwned;
use shared::{AddRowResponse, AnyTableView, PriceTableView, RowId, TotalsResponse};
use tempfile::TempDir;
use tower::ServiceExt;

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn seeded_app() -> Result<(Router, TempDir), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let mut config = LaudoConfig::default();
    config.data_directory = temp_dir.path().to_path_buf();
    config.geography.enable_remote = false;
    config.workbook.debounce_ms = 10;

    let app_state = initialize_backend(&config).await?;
    Ok((create_router(app_state, &config.server), temp_dir))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> Result<(StatusCode, Vec<u8>), Box<dyn std::error::Error>> {
    let builder = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))?,
        None => builder.body(Body::empty())?,
    };
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, bytes.to_vec()))
}

async fn get_json<T: DeserializeOwned>(app: &Router, uri: &str) -> Result<T, Box<dyn std::error::Error>> {
    let (status, body) = send(app, Method::GET, uri, None).await?;
    assert_eq!(status, StatusCode::OK, "GET {}", uri);
    Ok(serde_json::from_slice(&body)?)
}

async fn price_table(app: &Router) -> Result<PriceTableView, Box<dyn std::error::Error>> {
    match get_json::<AnyTableView>(app, "/api/tables/prices").await? {
        AnyTableView::Prices(view) => Ok(view),
        other => Err(format!("expected price table, got {:?}", other).into()),
    }
}

async fn price_row_id(app: &Router, key: &str) -> Result<RowId, Box<dyn std::error::Error>> {
    price_table(app)
        .await?
        .rows
        .into_iter()
        .find(|row| row.input.key == key)
        .map(|row| row.id)
        .ok_or_else(|| format!("no price row keyed {}", key).into())
}

#[tokio::test]
async fn test_removing_referenced_price_reprices_rows() -> TestResult {
    let (app, _temp_dir) = seeded_app().await?;

    let milho = price_row_id(&app, "MILHO").await?;
    let (status, _) = send(&app, Method::DELETE, &format!("/api/tables/prices/rows/{}", milho), None).await?;
    assert_eq!(status, StatusCode::OK);

    // The MILHO agricultural row (2 ha × 50) is now unpriced
    let totals: TotalsResponse = get_json(&app, "/api/totals").await?;
    assert!((totals.totals.agricultural - 73569.60).abs() < 0.001);
    assert_eq!(price_table(&app).await?.registered_keys, 2);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tables/prices/rows",
        Some(r#"{"key": " milho ", "value": 70.0, "source": "conab"}"#),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let added: AddRowResponse = serde_json::from_slice(&body)?;
    assert_eq!(price_row_id(&app, "MILHO").await?, added.row_id);

    let totals: TotalsResponse = get_json(&app, "/api/totals").await?;
    assert!((totals.totals.agricultural - 80569.60).abs() < 0.001);
    Ok(())
}

#[tokio::test]
async fn test_dairy_priced_by_fixed_key() -> TestResult {
    let (app, _temp_dir) = seeded_app().await?;

    let totals: TotalsResponse = get_json(&app, "/api/totals").await?;
    assert_eq!(totals.totals.livestock_dairy, 0.0);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/tables/prices/rows",
        Some(r#"{"key": "PECUÁRIA LEITEIRA", "value": 2.5}"#),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    // 18 L/day × 20 cows × 30 days × 2.5
    let totals: TotalsResponse = get_json(&app, "/api/totals").await?;
    assert!((totals.totals.livestock_dairy - 27000.0).abs() < 0.001);
    assert!((totals.totals.livestock_combined - 89529.74).abs() < 0.001);
    assert!((totals.totals.grand - 169399.34).abs() < 0.001);
    Ok(())
}

#[tokio::test]
async fn test_price_key_edit_collision_is_refused() -> TestResult {
    let (app, _temp_dir) = seeded_app().await?;

    let milho = price_row_id(&app, "MILHO").await?;
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/tables/prices/rows/{}", milho),
        Some(r#"{"field": "key", "value": "café arábica"}"#),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, Method::POST, "/api/recalculate", None).await?;
    assert_eq!(status, StatusCode::OK);
    let report: shared::RecalculationResponse = serde_json::from_slice(&body)?;
    assert!(report.rejections.is_empty());
    assert!((report.totals.grand - 142399.34).abs() < 0.001);
    Ok(())
}

#[tokio::test]
async fn test_debounced_edit_settles_without_explicit_recalculation() -> TestResult {
    let (app, _temp_dir) = seeded_app().await?;

    let milho = price_row_id(&app, "MILHO").await?;
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/tables/prices/rows/{}", milho),
        Some(r#"{"field": "value", "value": "70,00"}"#),
    )
    .await?;
    assert_eq!(status, StatusCode::ACCEPTED);

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    // MILHO row: 100 × 70 instead of 100 × 63
    let totals: TotalsResponse = get_json(&app, "/api/totals").await?;
    assert!((totals.totals.agricultural - 80569.60).abs() < 0.001);
    Ok(())
}
