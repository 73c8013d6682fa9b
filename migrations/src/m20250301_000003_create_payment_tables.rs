use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_sales_tables::Suppliers;
use crate::m20250301_000002_create_wallet_tables::SupplierWallets;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create supplier_payments table. Rows are immutable once COMPLETED;
        // corrections are new compensating rows, never updates.
        manager
            .create_table(
                Table::create()
                    .table(SupplierPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupplierPayments::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupplierPayments::SupplierId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SupplierPayments::WalletId).uuid().null())
                    .col(ColumnDef::new(SupplierPayments::Amount).decimal().not_null())
                    .col(
                        ColumnDef::new(SupplierPayments::PaymentReference)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SupplierPayments::PaymentDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupplierPayments::PaymentMethod)
                            .string()
                            .not_null()
                            .default("BANK_TRANSFER"),
                    )
                    .col(ColumnDef::new(SupplierPayments::BankName).string().null())
                    .col(
                        ColumnDef::new(SupplierPayments::BankAccountNumber)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SupplierPayments::BankAccountHolder)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SupplierPayments::PaymentProofUrl)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(SupplierPayments::Notes).text().null())
                    .col(
                        ColumnDef::new(SupplierPayments::Status)
                            .string()
                            .not_null()
                            .default("COMPLETED"),
                    )
                    .col(ColumnDef::new(SupplierPayments::PeriodStart).timestamp().null())
                    .col(ColumnDef::new(SupplierPayments::PeriodEnd).timestamp().null())
                    .col(ColumnDef::new(SupplierPayments::CreatedBy).uuid().null())
                    .col(
                        ColumnDef::new(SupplierPayments::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_payments_supplier")
                            .from(SupplierPayments::Table, SupplierPayments::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_payments_wallet")
                            .from(SupplierPayments::Table, SupplierPayments::WalletId)
                            .to(SupplierWallets::Table, SupplierWallets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create payment_settings singleton table. The fixed primary key
        // value enforces at most one row.
        manager
            .create_table(
                Table::create()
                    .table(PaymentSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentSettings::Id)
                            .integer()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::MinimumPayoutAmount)
                            .decimal()
                            .not_null()
                            .default(100000.0),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::MinimumWithdrawalAmount)
                            .decimal()
                            .not_null()
                            .default(50000.0),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::PaymentSchedule)
                            .string()
                            .not_null()
                            .default("MANUAL"),
                    )
                    .col(
                        ColumnDef::new(PaymentSettings::AllowPartialPayment)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PaymentSettings::UpdatedAt).timestamp().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SupplierPayments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SupplierPayments {
    Table,
    Id,
    SupplierId,
    WalletId,
    Amount,
    PaymentReference,
    PaymentDate,
    PaymentMethod,
    BankName,
    BankAccountNumber,
    BankAccountHolder,
    PaymentProofUrl,
    Notes,
    Status,
    PeriodStart,
    PeriodEnd,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum PaymentSettings {
    Table,
    Id,
    MinimumPayoutAmount,
    MinimumWithdrawalAmount,
    PaymentSchedule,
    AllowPartialPayment,
    UpdatedAt,
}
