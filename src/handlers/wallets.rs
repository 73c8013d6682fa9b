use super::common::{map_service_error, success_response, PaginatedResponse, PaginationParams};
use crate::{errors::ApiError, handlers::AppState};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Wallet view for a supplier, created lazily on first access. Lifetime
/// earnings are recomputed from sales history on every read, so this always
/// reflects the current state of the ledger.
async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let wallet = state
        .services
        .wallets
        .recompute_total_earned(supplier_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(wallet))
}

/// Journal of balance movements for a supplier's wallet, newest first
async fn list_wallet_transactions(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let wallet = state
        .services
        .wallets
        .get_by_supplier(supplier_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Wallet for supplier {} not found", supplier_id))
        })?;

    let (entries, total) = state
        .services
        .wallets
        .list_transactions(wallet.id, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        entries,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Creates the router for wallet endpoints
pub fn wallet_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:supplier_id", get(get_wallet))
        .route("/:supplier_id/transactions", get(list_wallet_transactions))
}
