use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Withdrawal lifecycle. Transitions only move forward:
/// PENDING -> APPROVED -> COMPLETED, or PENDING -> REJECTED.
/// COMPLETED and REJECTED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl WithdrawalStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::Completed)
        )
    }
}

/// A supplier-initiated request to debit available balance into a bank
/// payout. Funds are reserved at approval, not at creation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawal_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub wallet_id: Uuid,
    pub amount: Decimal,
    pub bank_name: String,
    pub account_number: String,
    pub account_holder_name: String,
    pub status: WithdrawalStatus,
    pub requested_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Mandatory when status is REJECTED.
    pub rejection_reason: Option<String>,
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

#[cfg(test)]
mod tests {
    use super::WithdrawalStatus::*;

    #[test]
    fn forward_transitions_only() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Completed));

        assert!(!Approved.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn terminal_states() {
        assert!(Completed.is_terminal());
        assert!(Rejected.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!Approved.is_terminal());
    }
}
