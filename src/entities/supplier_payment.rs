use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a payout left the platform. BANK_TRANSFER is the only method the
/// back office currently records; the column exists so manual/e-wallet
/// payouts can be recorded without a schema change.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "BANK_TRANSFER")]
    BankTransfer,
    #[sea_orm(string_value = "CASH")]
    Cash,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

/// Payment record status. COMPLETED is the only state ever written; the
/// enum keeps the column honest rather than encoding a workflow.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

/// An admin-recorded transfer of money to a supplier. Immutable once
/// written; a wrong payment is corrected by a new compensating row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "supplier_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub wallet_id: Option<Uuid>,
    pub amount: Decimal,
    /// Human-readable unique reference, e.g. TRF-20250301-483-KBI.
    #[sea_orm(unique)]
    pub payment_reference: String,
    pub payment_date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    /// Destination bank snapshot taken from the supplier at recording time,
    /// so later edits to the supplier profile never rewrite payment history.
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_account_holder: Option<String>,
    pub payment_proof_url: Option<String>,
    pub notes: Option<String>,
    pub status: PaymentStatus,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
