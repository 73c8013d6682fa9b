use super::common::{map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError, handlers::AppState, services::settings::UpdateSettingsRequest,
};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tracing::info;

/// Current payment policy (payout threshold, withdrawal minimum, schedule)
async fn get_payment_settings(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = state
        .services
        .settings
        .get()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(settings))
}

/// Update the payment policy
async fn update_payment_settings(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let settings = state
        .services
        .settings
        .update(payload)
        .await
        .map_err(map_service_error)?;

    info!("Payment settings updated");

    Ok(success_response(settings))
}

/// Creates the router for settings endpoints
pub fn settings_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payments", get(get_payment_settings))
        .route("/payments", put(update_payment_settings))
}
