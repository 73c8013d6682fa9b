use crate::{
    db::DbPool,
    entities::sales_transaction::{self, TransactionStatus},
    entities::sales_transaction_item::{self, Entity as SaleItemEntity},
    errors::ServiceError,
};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter, QuerySelect, RelationTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument};
use uuid::Uuid;

/// Half-open settlement period [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ServiceError> {
        if start >= end {
            return Err(ServiceError::ValidationError(
                "period start must precede period end".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// The calendar month containing `at`.
    pub fn month_of(at: DateTime<Utc>) -> Self {
        let start = Utc
            .with_ymd_and_hms(at.year(), at.month(), 1, 0, 0, 0)
            .unwrap();
        let (next_year, next_month) = if at.month() == 12 {
            (at.year() + 1, 1)
        } else {
            (at.year(), at.month() + 1)
        };
        let end = Utc
            .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
            .unwrap();
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

#[derive(Debug, FromQueryResult)]
struct RevenueSum {
    total: Option<Decimal>,
}

/// Read-only access to completed sale line items. This is the single entry
/// point from which every settlement figure is derived; a failed read here
/// aborts the computation rather than zero-filling it.
#[derive(Clone)]
pub struct SalesLedgerService {
    db_pool: Arc<DbPool>,
}

impl SalesLedgerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Returns every line item of a COMPLETED transaction created within the
    /// period, optionally restricted to a supplier set. Filtering happens in
    /// SQL so large periods do not balloon memory. Each item appears at most
    /// once; no ordering is guaranteed.
    #[instrument(skip(self))]
    pub async fn completed_items(
        &self,
        supplier_ids: Option<&[Uuid]>,
        period: Period,
    ) -> Result<Vec<sales_transaction_item::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = SaleItemEntity::find()
            .join(
                JoinType::InnerJoin,
                sales_transaction_item::Relation::Transaction.def(),
            )
            .filter(sales_transaction::Column::Status.eq(TransactionStatus::Completed))
            .filter(sales_transaction_item::Column::CreatedAt.gte(period.start))
            .filter(sales_transaction_item::Column::CreatedAt.lt(period.end));

        if let Some(ids) = supplier_ids {
            query = query.filter(
                sales_transaction_item::Column::SupplierId.is_in(ids.iter().copied()),
            );
        }

        query.all(db).await.map_err(|e| {
            error!(error = %e, "Failed to read sale line items");
            ServiceError::SourceUnavailable(format!("sales ledger read failed: {}", e))
        })
    }

    /// All-time COMPLETED supplier revenue for one supplier, summed in SQL.
    /// This is the authoritative figure behind wallet.total_earned.
    #[instrument(skip(self), fields(supplier_id = %supplier_id))]
    pub async fn lifetime_revenue(&self, supplier_id: Uuid) -> Result<Decimal, ServiceError> {
        let db = &*self.db_pool;

        let sum = SaleItemEntity::find()
            .select_only()
            .column_as(sales_transaction_item::Column::SupplierRevenue.sum(), "total")
            .join(
                JoinType::InnerJoin,
                sales_transaction_item::Relation::Transaction.def(),
            )
            .filter(sales_transaction::Column::Status.eq(TransactionStatus::Completed))
            .filter(sales_transaction_item::Column::SupplierId.eq(supplier_id))
            .into_model::<RevenueSum>()
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, supplier_id = %supplier_id, "Failed to sum lifetime revenue");
                ServiceError::SourceUnavailable(format!("sales ledger read failed: {}", e))
            })?;

        Ok(sum.and_then(|s| s.total).unwrap_or(Decimal::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_rejects_inverted_range() {
        let now = Utc::now();
        assert!(Period::new(now, now).is_err());
        assert!(Period::new(now + chrono::Duration::days(1), now).is_err());
    }

    #[test]
    fn month_of_covers_the_full_month() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let period = Period::month_of(ts);
        assert!(period.contains(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));
        assert!(period.contains(Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap()));
        assert!(!period.contains(Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn month_of_rolls_over_december() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 25, 12, 0, 0).unwrap();
        let period = Period::month_of(ts);
        assert_eq!(period.end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }
}
