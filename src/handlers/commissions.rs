use super::common::{map_service_error, success_response, PeriodQuery};
use crate::{errors::ApiError, handlers::AppState};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CommissionListQuery {
    pub start: Option<chrono::DateTime<chrono::Utc>>,
    pub end: Option<chrono::DateTime<chrono::Utc>>,
    /// Comma-separated supplier UUIDs; all suppliers when omitted.
    pub supplier_ids: Option<String>,
}

fn parse_supplier_ids(raw: &Option<String>) -> Result<Option<Vec<Uuid>>, ApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = part.parse::<Uuid>().map_err(|_| {
            ApiError::BadRequest(format!("'{}' is not a valid supplier id", part))
        })?;
        ids.push(id);
    }

    if ids.is_empty() {
        return Err(ApiError::BadRequest(
            "supplier_ids must contain at least one id".to_string(),
        ));
    }
    Ok(Some(ids))
}

/// Commission list for a period: totals plus settlement state per supplier
async fn list_commissions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CommissionListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = PeriodQuery {
        start: query.start,
        end: query.end,
    }
    .resolve()?;
    let supplier_ids = parse_supplier_ids(&query.supplier_ids)?;

    let overviews = state
        .services
        .commissions
        .get_commission_overviews(supplier_ids, period)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(overviews))
}

/// Settlement status of one supplier for a period
async fn get_settlement_status(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = query.resolve()?;

    let view = state
        .services
        .commissions
        .get_settlement_status(supplier_id, period)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(view))
}

/// Threshold partition of unpaid suppliers for a period
async fn get_ready_to_pay(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = query.resolve()?;

    let partition = state
        .services
        .commissions
        .get_ready_to_pay(period)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(partition))
}

/// Creates the router for commission endpoints
pub fn commission_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_commissions))
        .route("/ready-to-pay", get(get_ready_to_pay))
        .route("/:supplier_id/settlement", get(get_settlement_status))
}
