use super::common::{
    created_response, map_service_error, success_response, PaginatedResponse, PeriodQuery,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::payments::RecordPaymentRequest,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub start: Option<chrono::DateTime<chrono::Utc>>,
    pub end: Option<chrono::DateTime<chrono::Utc>>,
    pub supplier_id: Option<Uuid>,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct AttachProofRequest {
    pub proof_url: String,
}

/// Record a completed payment to a supplier
async fn record_payment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let recorded = state
        .services
        .payments
        .record_payment(payload)
        .await
        .map_err(map_service_error)?;

    info!(
        "Payment recorded: {} ({})",
        recorded.payment.id, recorded.payment.payment_reference
    );

    Ok(created_response(recorded))
}

/// Get a payment by ID
async fn get_payment(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .services
        .payments
        .get_payment(payment_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Payment with ID {} not found", payment_id)))?;

    Ok(success_response(payment))
}

/// Payment history with optional supplier and period filters
async fn list_payments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = PeriodQuery {
        start: query.start,
        end: query.end,
    }
    .resolve_optional()?;

    let (payments, total) = state
        .services
        .payments
        .list_payments(query.supplier_id, period, query.page, query.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        payments,
        query.page,
        query.per_page,
        total,
    )))
}

/// Attach a transfer proof to an existing payment
async fn attach_proof(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<AttachProofRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .services
        .payments
        .attach_proof(payment_id, &payload.proof_url)
        .await
        .map_err(map_service_error)?;

    info!("Proof attached to payment {}", payment.id);

    Ok(success_response(payment))
}

/// Creates the router for payment endpoints
pub fn payment_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(record_payment))
        .route("/", get(list_payments))
        .route("/:id", get(get_payment))
        .route("/:id/proof", post(attach_proof))
}
