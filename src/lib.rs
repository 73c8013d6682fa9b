//! Titipan API Library
//!
//! Back-office services for a consignment marketplace: the commission and
//! settlement ledger, supplier wallets, withdrawal requests, and payout
//! recording.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

/// Liveness/readiness probe; degrades rather than errors when the database
/// is unreachable.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let database = match db::check_connection(&state.db).await {
        Ok(()) => "up",
        Err(_) => "down",
    };

    Json(json!({
        "status": if database == "up" { "ok" } else { "degraded" },
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Composes the full API surface over shared state.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest(
            "/api/v1/commissions",
            handlers::commissions::commission_routes(),
        )
        .nest("/api/v1/wallets", handlers::wallets::wallet_routes())
        .nest(
            "/api/v1/withdrawals",
            handlers::withdrawals::withdrawal_routes(),
        )
        .nest("/api/v1/payments", handlers::payments::payment_routes())
        .nest("/api/v1/settings", handlers::settings::settings_routes())
        .with_state(state)
}
