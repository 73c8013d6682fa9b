use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_sales_tables::Suppliers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create supplier_wallets table. One wallet per supplier is a hard
        // constraint: concurrent lazy creation relies on the unique index.
        manager
            .create_table(
                Table::create()
                    .table(SupplierWallets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupplierWallets::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupplierWallets::SupplierId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SupplierWallets::AvailableBalance)
                            .decimal()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SupplierWallets::PendingBalance)
                            .decimal()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SupplierWallets::TotalEarned)
                            .decimal()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SupplierWallets::TotalWithdrawn)
                            .decimal()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SupplierWallets::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(SupplierWallets::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SupplierWallets::UpdatedAt).timestamp().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_wallets_supplier")
                            .from(SupplierWallets::Table, SupplierWallets::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create wallet_transactions journal table (append-only)
        manager
            .create_table(
                Table::create()
                    .table(WalletTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletTransactions::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::WalletId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::TransactionType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::Amount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::BalanceAfter)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WalletTransactions::ReferenceId).uuid().null())
                    .col(
                        ColumnDef::new(WalletTransactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wallet_transactions_wallet")
                            .from(WalletTransactions::Table, WalletTransactions::WalletId)
                            .to(SupplierWallets::Table, SupplierWallets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create withdrawal_requests table
        manager
            .create_table(
                Table::create()
                    .table(WithdrawalRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WithdrawalRequests::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::SupplierId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::WalletId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::Amount)
                            .decimal()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WithdrawalRequests::BankName).string().not_null())
                    .col(
                        ColumnDef::new(WithdrawalRequests::AccountNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::AccountHolderName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(WithdrawalRequests::RequestedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WithdrawalRequests::ReviewedAt).timestamp().null())
                    .col(
                        ColumnDef::new(WithdrawalRequests::RejectionReason)
                            .text()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_withdrawal_requests_wallet")
                            .from(WithdrawalRequests::Table, WithdrawalRequests::WalletId)
                            .to(SupplierWallets::Table, SupplierWallets::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WithdrawalRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WalletTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SupplierWallets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SupplierWallets {
    Table,
    Id,
    SupplierId,
    AvailableBalance,
    PendingBalance,
    TotalEarned,
    TotalWithdrawn,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum WalletTransactions {
    Table,
    Id,
    WalletId,
    TransactionType,
    Amount,
    BalanceAfter,
    Description,
    ReferenceId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum WithdrawalRequests {
    Table,
    Id,
    SupplierId,
    WalletId,
    Amount,
    BankName,
    AccountNumber,
    AccountHolderName,
    Status,
    RequestedAt,
    ReviewedAt,
    RejectionReason,
}
