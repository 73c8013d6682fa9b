use super::common::{
    created_response, map_service_error, success_response, validate_input, PaginatedResponse,
};
use crate::{
    entities::withdrawal_request::WithdrawalStatus,
    errors::ApiError,
    handlers::AppState,
    services::withdrawals::CreateWithdrawalRequest,
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
pub struct WithdrawalListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub supplier_id: Option<Uuid>,
    pub status: Option<WithdrawalStatus>,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct RejectWithdrawalRequest {
    pub reason: String,
}

/// Create a new withdrawal request
async fn create_withdrawal(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateWithdrawalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let request = state
        .services
        .withdrawals
        .create(payload)
        .await
        .map_err(map_service_error)?;

    info!("Withdrawal requested: {}", request.id);

    Ok(created_response(request))
}

/// Get a withdrawal request by ID
async fn get_withdrawal(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let request = state
        .services
        .withdrawals
        .get(request_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Withdrawal request {} not found", request_id))
        })?;

    Ok(success_response(request))
}

/// List withdrawal requests with optional supplier/status filters
async fn list_withdrawals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WithdrawalListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (requests, total) = state
        .services
        .withdrawals
        .list(query.supplier_id, query.status, query.page, query.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        requests,
        query.page,
        query.per_page,
        total,
    )))
}

/// Approve a pending withdrawal, reserving the funds
async fn approve_withdrawal(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let request = state
        .services
        .withdrawals
        .approve(request_id)
        .await
        .map_err(map_service_error)?;

    info!("Withdrawal approved: {}", request.id);

    Ok(success_response(request))
}

/// Mark an approved withdrawal as paid out
async fn complete_withdrawal(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let request = state
        .services
        .withdrawals
        .complete(request_id)
        .await
        .map_err(map_service_error)?;

    info!("Withdrawal completed: {}", request.id);

    Ok(success_response(request))
}

/// Reject a pending withdrawal with a mandatory reason
async fn reject_withdrawal(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<RejectWithdrawalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = state
        .services
        .withdrawals
        .reject(request_id, &payload.reason)
        .await
        .map_err(map_service_error)?;

    info!("Withdrawal rejected: {}", request.id);

    Ok(success_response(request))
}

/// Creates the router for withdrawal endpoints
pub fn withdrawal_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_withdrawal))
        .route("/", get(list_withdrawals))
        .route("/:id", get(get_withdrawal))
        .route("/:id/approve", post(approve_withdrawal))
        .route("/:id/complete", post(complete_withdrawal))
        .route("/:id/reject", post(reject_withdrawal))
}
