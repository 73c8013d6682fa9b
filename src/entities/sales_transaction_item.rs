use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One sold unit-quantity of one product within one transaction. The money
/// split is stored per line at sale time; commission_amount and
/// supplier_revenue always sum back to subtotal (within one rupiah).
/// Rows are immutable: corrections arrive as new entries, never as edits.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_transaction_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    /// Snapshotted from the product at sale time so settlement never has to
    /// chase product reassignments.
    pub supplier_id: Uuid,
    pub outlet_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub commission_amount: Decimal,
    pub supplier_revenue: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales_transaction::Entity",
        from = "Column::TransactionId",
        to = "super::sales_transaction::Column::Id"
    )]
    Transaction,
}

impl Related<super::sales_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the stored money split is internally consistent, allowing a
    /// one-minor-unit rounding slack.
    pub fn split_is_consistent(&self) -> bool {
        let drift = (self.commission_amount + self.supplier_revenue - self.subtotal).abs();
        drift <= Decimal::ONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(subtotal: Decimal, commission: Decimal, revenue: Decimal) -> Model {
        Model {
            id: Uuid::new_v4(),
            transaction_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            supplier_id: Uuid::new_v4(),
            outlet_id: Uuid::new_v4(),
            quantity: 1,
            unit_price: subtotal,
            subtotal,
            commission_amount: commission,
            supplier_revenue: revenue,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn split_consistency_tolerates_one_minor_unit() {
        assert!(item(dec!(10000), dec!(1000), dec!(9000)).split_is_consistent());
        assert!(item(dec!(10001), dec!(1000), dec!(9000)).split_is_consistent());
        assert!(!item(dec!(10000), dec!(1000), dec!(8500)).split_is_consistent());
    }
}
