pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_sales_tables;
mod m20250301_000002_create_wallet_tables;
mod m20250301_000003_create_payment_tables;
mod m20250315_000004_add_ledger_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_sales_tables::Migration),
            Box::new(m20250301_000002_create_wallet_tables::Migration),
            Box::new(m20250301_000003_create_payment_tables::Migration),
            Box::new(m20250315_000004_add_ledger_indexes::Migration),
        ]
    }
}
