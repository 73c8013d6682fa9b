use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of wallet journal entry. Amounts are signed from the wallet's
/// point of view: credits positive, holds and payouts negative.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletEntryType {
    #[sea_orm(string_value = "SALE_CREDIT")]
    SaleCredit,
    #[sea_orm(string_value = "WITHDRAWAL_HOLD")]
    WithdrawalHold,
    #[sea_orm(string_value = "WITHDRAWAL_PAYOUT")]
    WithdrawalPayout,
    #[sea_orm(string_value = "WITHDRAWAL_RELEASE")]
    WithdrawalRelease,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
}

/// Append-only audit journal for wallet balance movements, written in the
/// same transaction as the balance change it describes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub transaction_type: WalletEntryType,
    pub amount: Decimal,
    /// Available balance immediately after this entry was applied.
    pub balance_after: Decimal,
    pub description: String,
    /// The withdrawal request or payment this entry belongs to, if any.
    pub reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier_wallet::Entity",
        from = "Column::WalletId",
        to = "super::supplier_wallet::Column::Id"
    )]
    Wallet,
}

impl Related<super::supplier_wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
