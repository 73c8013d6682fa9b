use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_sales_tables::{SalesTransactionItems, SalesTransactions};
use crate::m20250301_000002_create_wallet_tables::{WalletTransactions, WithdrawalRequests};
use crate::m20250301_000003_create_payment_tables::SupplierPayments;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Commission aggregation scans line items by supplier within a
        // period; the join to the parent transaction rides on transaction_id.
        manager
            .create_index(
                Index::create()
                    .name("idx_sales_items_supplier_created")
                    .table(SalesTransactionItems::Table)
                    .col(SalesTransactionItems::SupplierId)
                    .col(SalesTransactionItems::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_items_transaction_id")
                    .table(SalesTransactionItems::Table)
                    .col(SalesTransactionItems::TransactionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_transactions_status_created")
                    .table(SalesTransactions::Table)
                    .col(SalesTransactions::Status)
                    .col(SalesTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Reconciliation sums payments per supplier per period.
        manager
            .create_index(
                Index::create()
                    .name("idx_supplier_payments_supplier_date")
                    .table(SupplierPayments::Table)
                    .col(SupplierPayments::SupplierId)
                    .col(SupplierPayments::PaymentDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_withdrawal_requests_supplier_status")
                    .table(WithdrawalRequests::Table)
                    .col(WithdrawalRequests::SupplierId)
                    .col(WithdrawalRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_wallet_transactions_wallet_created")
                    .table(WalletTransactions::Table)
                    .col(WalletTransactions::WalletId)
                    .col((WalletTransactions::CreatedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_wallet_transactions_wallet_created")
                    .table(WalletTransactions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_withdrawal_requests_supplier_status")
                    .table(WithdrawalRequests::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_supplier_payments_supplier_date")
                    .table(SupplierPayments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_sales_transactions_status_created")
                    .table(SalesTransactions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_sales_items_transaction_id")
                    .table(SalesTransactionItems::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_sales_items_supplier_created")
                    .table(SalesTransactionItems::Table)
                    .to_owned(),
            )
            .await
    }
}
