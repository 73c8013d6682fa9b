use crate::errors::{ApiError, ServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

use crate::services::sales_ledger::Period;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Pagination parameters for list operations
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// Standard pagination response metadata
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Standard paginated response wrapper
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(page, per_page, total),
        }
    }
}

/// Settlement period selection for read endpoints. Both bounds or neither:
/// omitted entirely, the current calendar month applies.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PeriodQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl PeriodQuery {
    pub fn resolve(&self) -> Result<Period, ApiError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => {
                Period::new(start, end).map_err(map_service_error)
            }
            (None, None) => Ok(Period::month_of(Utc::now())),
            _ => Err(ApiError::BadRequest(
                "provide both start and end, or neither for the current month".to_string(),
            )),
        }
    }

    /// Like `resolve`, but with no default: None when neither bound is set.
    pub fn resolve_optional(&self) -> Result<Option<Period>, ApiError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Period::new(start, end)
                .map(Some)
                .map_err(map_service_error),
            (None, None) => Ok(None),
            _ => Err(ApiError::BadRequest(
                "provide both start and end, or neither".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_meta_rounds_total_pages_up() {
        let meta = PaginationMeta::new(1, 20, 41);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn period_query_requires_both_bounds() {
        let query = PeriodQuery {
            start: Some(Utc::now()),
            end: None,
        };
        assert!(query.resolve().is_err());
        assert!(query.resolve_optional().is_err());
    }

    #[test]
    fn empty_period_query_defaults_to_current_month() {
        let query = PeriodQuery {
            start: None,
            end: None,
        };
        let period = query.resolve().expect("defaults to current month");
        assert!(period.contains(Utc::now()));
        assert!(query.resolve_optional().unwrap().is_none());
    }
}
