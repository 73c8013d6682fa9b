use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create suppliers table
        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Suppliers::Id).uuid().primary_key().not_null())
                    .col(
                        ColumnDef::new(Suppliers::BusinessName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Suppliers::ContactName).string().null())
                    .col(ColumnDef::new(Suppliers::Phone).string().null())
                    .col(ColumnDef::new(Suppliers::BankName).string().null())
                    .col(ColumnDef::new(Suppliers::BankAccountNumber).string().null())
                    .col(ColumnDef::new(Suppliers::BankAccountHolder).string().null())
                    .col(
                        ColumnDef::new(Suppliers::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(Suppliers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Suppliers::UpdatedAt).timestamp().null())
                    .to_owned(),
            )
            .await?;

        // Create sales_transactions table (written by the sales subsystem,
        // read-only for the ledger)
        manager
            .create_table(
                Table::create()
                    .table(SalesTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SalesTransactions::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalesTransactions::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SalesTransactions::OutletId).uuid().not_null())
                    .col(
                        ColumnDef::new(SalesTransactions::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(SalesTransactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create sales_transaction_items table
        manager
            .create_table(
                Table::create()
                    .table(SalesTransactionItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SalesTransactionItems::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalesTransactionItems::TransactionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalesTransactionItems::ProductId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalesTransactionItems::SupplierId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalesTransactionItems::OutletId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalesTransactionItems::Quantity)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalesTransactionItems::UnitPrice)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalesTransactionItems::Subtotal)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SalesTransactionItems::CommissionAmount)
                            .decimal()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SalesTransactionItems::SupplierRevenue)
                            .decimal()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SalesTransactionItems::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_items_transaction")
                            .from(
                                SalesTransactionItems::Table,
                                SalesTransactionItems::TransactionId,
                            )
                            .to(SalesTransactions::Table, SalesTransactions::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SalesTransactionItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SalesTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Suppliers {
    Table,
    Id,
    BusinessName,
    ContactName,
    Phone,
    BankName,
    BankAccountNumber,
    BankAccountHolder,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum SalesTransactions {
    Table,
    Id,
    Code,
    OutletId,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum SalesTransactionItems {
    Table,
    Id,
    TransactionId,
    ProductId,
    SupplierId,
    OutletId,
    Quantity,
    UnitPrice,
    Subtotal,
    CommissionAmount,
    SupplierRevenue,
    CreatedAt,
}
