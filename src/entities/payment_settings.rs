use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fixed primary key of the singleton row.
pub const SINGLETON_ID: i32 = 1;

/// Advisory payout cadence shown to admins. The ledger never triggers
/// payments on a schedule; MANUAL is the operative reality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentSchedule {
    #[sea_orm(string_value = "MANUAL")]
    Manual,
    #[sea_orm(string_value = "WEEKLY")]
    Weekly,
    #[sea_orm(string_value = "BIWEEKLY")]
    Biweekly,
    #[sea_orm(string_value = "MONTHLY")]
    Monthly,
}

/// Process-wide payment policy. A single row keyed by SINGLETON_ID; always
/// passed into the classifier and withdrawal handler as an explicit value
/// so tests can supply arbitrary thresholds.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    /// Minimum outstanding amount before a supplier joins the ready-to-pay
    /// batch. Default Rp 100.000.
    pub minimum_payout_amount: Decimal,
    /// Minimum amount a supplier may request to withdraw. Default Rp 50.000.
    pub minimum_withdrawal_amount: Decimal,
    pub payment_schedule: PaymentSchedule,
    /// Advisory flag surfaced to the admin UI; the ledger does not enforce it.
    pub allow_partial_payment: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Default for Model {
    fn default() -> Self {
        Self {
            id: SINGLETON_ID,
            minimum_payout_amount: Decimal::new(100_000, 0),
            minimum_withdrawal_amount: Decimal::new(50_000, 0),
            payment_schedule: PaymentSchedule::Manual,
            allow_partial_payment: false,
            updated_at: None,
        }
    }
}
