use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-supplier running balance record. One row per supplier, created lazily
/// on first access and never deleted.
///
/// available_balance never goes negative; it only decreases at withdrawal
/// approval. pending_balance holds approved-but-not-yet-paid-out funds.
/// total_earned is recomputed from COMPLETED sale line items rather than
/// incrementally accumulated, so late corrections to sales history surface
/// without manual adjustment.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "supplier_wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub supplier_id: Uuid,
    pub available_balance: Decimal,
    pub pending_balance: Decimal,
    pub total_earned: Decimal,
    pub total_withdrawn: Decimal,
    /// Optimistic-concurrency counter; every balance mutation checks and
    /// bumps it so concurrent writers serialize per wallet.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
    #[sea_orm(has_many = "super::wallet_transaction::Entity")]
    Transactions,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::wallet_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn has_pending_withdrawal(&self) -> bool {
        self.pending_balance > Decimal::ZERO
    }

    pub fn can_cover(&self, amount: Decimal) -> bool {
        amount <= self.available_balance
    }
}
