mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{march_2025, TestApp};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::Value;
use titipan_api::{app_router, config::AppConfig, events::EventSender, AppState};
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Builds the full router over a TestApp's database.
fn router_for(app: &TestApp) -> axum::Router {
    let (event_tx, _event_rx) = mpsc::channel(16);
    let state = AppState {
        db: app.db.clone(),
        config: AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            0,
            "test".into(),
        ),
        event_sender: EventSender::new(event_tx),
        services: app.services.clone(),
    };
    app_router(Arc::new(state))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_database_state() {
    let app = TestApp::new().await;
    let router = router_for(&app);

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let payload = body_json(response).await;
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["database"], "up");
}

#[tokio::test]
async fn commission_list_returns_settlement_rows() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Warung HTTP").await;
    app.seed_completed_march_sale(supplier.id, dec!(330000), dec!(30000))
        .await;

    let router = router_for(&app);
    let period = march_2025();
    let uri = format!(
        "/api/v1/commissions/?start={}&end={}",
        period.start.to_rfc3339(),
        period.end.to_rfc3339()
    );
    let uri = uri.replace('+', "%2B");

    let response = router
        .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let payload = body_json(response).await;
    let rows = payload.as_array().expect("array of overview rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["supplier_name"], "Warung HTTP");
    assert_eq!(rows[0]["status"], "UNPAID");
}

#[tokio::test]
async fn mismatched_period_bounds_are_a_bad_request() {
    let app = TestApp::new().await;
    let router = router_for(&app);

    let response = router
        .oneshot(
            Request::get("/api/v1/commissions/?start=2025-03-01T00:00:00Z")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settings_round_trip_over_http() {
    let app = TestApp::new().await;
    let router = router_for(&app);

    let response = router
        .clone()
        .oneshot(
            Request::put("/api/v1/settings/payments")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "minimum_payout_amount": "125000" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::get("/api/v1/settings/payments")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["minimum_payout_amount"], "125000");
    assert_eq!(payload["payment_schedule"], "MANUAL");
}
