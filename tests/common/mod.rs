#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use titipan_api::{
    db::{self, DbConfig, DbPool},
    entities::{
        sales_transaction::{self, TransactionStatus},
        sales_transaction_item, supplier,
        supplier::SupplierStatus,
    },
    handlers::AppServices,
    services::sales_ledger::Period,
};

/// Test harness: a fresh in-memory SQLite database with the real migrations
/// applied and the full service graph wired over it.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };

        let pool = db::establish_connection_with_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db = Arc::new(pool);
        let services = AppServices::new(db.clone(), None, Decimal::new(10, 2));

        Self { db, services }
    }

    /// Inserts an APPROVED supplier with bank coordinates.
    pub async fn seed_supplier(&self, business_name: &str) -> supplier::Model {
        let now = Utc::now();
        supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            business_name: Set(business_name.to_string()),
            contact_name: Set(Some("Ibu Sari".to_string())),
            phone: Set(Some("+62811111111".to_string())),
            bank_name: Set(Some("BCA".to_string())),
            bank_account_number: Set(Some("1234567890".to_string())),
            bank_account_holder: Set(Some(business_name.to_string())),
            status: Set(SupplierStatus::Approved),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed supplier")
    }

    /// Inserts a sale transaction with a single line item for the supplier.
    /// Returns the transaction id.
    pub async fn seed_sale(
        &self,
        supplier_id: Uuid,
        subtotal: Decimal,
        commission: Decimal,
        status: TransactionStatus,
        at: DateTime<Utc>,
    ) -> Uuid {
        let transaction_id = Uuid::new_v4();
        sales_transaction::ActiveModel {
            id: Set(transaction_id),
            code: Set(format!("TRX-{}", &transaction_id.simple().to_string()[..12])),
            outlet_id: Set(Uuid::new_v4()),
            status: Set(status),
            created_at: Set(at),
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed sale transaction");

        sales_transaction_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(transaction_id),
            product_id: Set(Uuid::new_v4()),
            supplier_id: Set(supplier_id),
            outlet_id: Set(Uuid::new_v4()),
            quantity: Set(1),
            unit_price: Set(subtotal),
            subtotal: Set(subtotal),
            commission_amount: Set(commission),
            supplier_revenue: Set(subtotal - commission),
            created_at: Set(at),
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed sale line item");

        transaction_id
    }

    /// A completed sale inside `march_2025()`.
    pub async fn seed_completed_march_sale(
        &self,
        supplier_id: Uuid,
        subtotal: Decimal,
        commission: Decimal,
    ) -> Uuid {
        self.seed_sale(
            supplier_id,
            subtotal,
            commission,
            TransactionStatus::Completed,
            march(14),
        )
        .await
    }
}

/// Fixed test period: March 2025.
pub fn march_2025() -> Period {
    Period::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(),
    )
    .unwrap()
}

/// A timestamp on the given day of March 2025.
pub fn march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, 10, 0, 0).unwrap()
}
