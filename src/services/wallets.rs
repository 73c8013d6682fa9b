use crate::{
    db::DbPool,
    entities::supplier::Entity as SupplierEntity,
    entities::supplier_wallet::{self, Entity as WalletEntity},
    entities::wallet_transaction::{self, WalletEntryType},
    errors::ServiceError,
    events::{Event, EventSender},
    services::sales_ledger::SalesLedgerService,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Version-guarded wallet updates are retried this many times before the
/// conflict is surfaced to the caller.
const MAX_VERSION_RETRIES: u32 = 3;

/// Keeper of per-supplier running balances.
///
/// Balance-decreasing updates are guarded in SQL by the balance itself, so
/// two racing debits can never overdraw; everything else serializes through
/// the wallet's version counter with a bounded retry.
#[derive(Clone)]
pub struct WalletService {
    db_pool: Arc<DbPool>,
    ledger: Arc<SalesLedgerService>,
    event_sender: Option<Arc<EventSender>>,
}

impl WalletService {
    pub fn new(
        db_pool: Arc<DbPool>,
        ledger: Arc<SalesLedgerService>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db_pool,
            ledger,
            event_sender,
        }
    }

    /// Fetches a supplier's wallet without creating one.
    #[instrument(skip(self))]
    pub async fn get_by_supplier(
        &self,
        supplier_id: Uuid,
    ) -> Result<Option<supplier_wallet::Model>, ServiceError> {
        let db = &*self.db_pool;
        WalletEntity::find()
            .filter(supplier_wallet::Column::SupplierId.eq(supplier_id))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Bulk wallet lookup for reconciliation reads. Suppliers without a
    /// wallet are simply absent from the result.
    pub(crate) async fn by_supplier_ids(
        &self,
        supplier_ids: &[Uuid],
    ) -> Result<Vec<supplier_wallet::Model>, ServiceError> {
        if supplier_ids.is_empty() {
            return Ok(Vec::new());
        }

        let db = &*self.db_pool;
        WalletEntity::find()
            .filter(supplier_wallet::Column::SupplierId.is_in(supplier_ids.iter().copied()))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Returns the supplier's wallet, creating an empty one on first access.
    ///
    /// Creation races are settled by the unique index on supplier_id: the
    /// loser's insert fails and it reads the winner's row instead.
    #[instrument(skip(self))]
    pub async fn get_or_create(
        &self,
        supplier_id: Uuid,
    ) -> Result<supplier_wallet::Model, ServiceError> {
        if let Some(wallet) = self.get_by_supplier(supplier_id).await? {
            return Ok(wallet);
        }

        let db = &*self.db_pool;
        let exists = SupplierEntity::find_by_id(supplier_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .is_some();
        if !exists {
            return Err(ServiceError::NotFound(format!(
                "Supplier with ID {} not found",
                supplier_id
            )));
        }

        let now = Utc::now();
        let wallet_id = Uuid::new_v4();
        let active = supplier_wallet::ActiveModel {
            id: Set(wallet_id),
            supplier_id: Set(supplier_id),
            available_balance: Set(Decimal::ZERO),
            pending_balance: Set(Decimal::ZERO),
            total_earned: Set(Decimal::ZERO),
            total_withdrawn: Set(Decimal::ZERO),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        match active.insert(db).await {
            Ok(wallet) => {
                info!(wallet_id = %wallet.id, supplier_id = %supplier_id, "Wallet created");
                if let Some(event_sender) = &self.event_sender {
                    if let Err(e) = event_sender.send(Event::WalletCreated(wallet.id)).await {
                        warn!(error = %e, wallet_id = %wallet.id, "Failed to send wallet created event");
                    }
                }
                Ok(wallet)
            }
            Err(insert_err) => {
                // Losing the creation race is success: the other writer's
                // row is the wallet.
                match self.get_by_supplier(supplier_id).await? {
                    Some(wallet) => Ok(wallet),
                    None => {
                        error!(error = %insert_err, supplier_id = %supplier_id, "Wallet creation failed");
                        Err(ServiceError::DatabaseError(insert_err))
                    }
                }
            }
        }
    }

    /// Recomputes lifetime earnings from COMPLETED sale line items and
    /// persists the result. The sum is always taken fresh; the stored column
    /// is display cache, never the source of truth.
    #[instrument(skip(self))]
    pub async fn recompute_total_earned(
        &self,
        supplier_id: Uuid,
    ) -> Result<supplier_wallet::Model, ServiceError> {
        let total = self.ledger.lifetime_revenue(supplier_id).await?;
        let db = &*self.db_pool;

        for _ in 0..MAX_VERSION_RETRIES {
            let wallet = self.get_or_create(supplier_id).await?;
            if wallet.total_earned == total {
                return Ok(wallet);
            }

            let result = WalletEntity::update_many()
                .col_expr(supplier_wallet::Column::TotalEarned, Expr::value(total))
                .col_expr(
                    supplier_wallet::Column::Version,
                    Expr::col(supplier_wallet::Column::Version).add(1),
                )
                .col_expr(
                    supplier_wallet::Column::UpdatedAt,
                    Expr::value(Some(Utc::now())),
                )
                .filter(supplier_wallet::Column::Id.eq(wallet.id))
                .filter(supplier_wallet::Column::Version.eq(wallet.version))
                .exec(db)
                .await
                .map_err(ServiceError::DatabaseError)?;

            if result.rows_affected == 1 {
                return self
                    .get_by_supplier(supplier_id)
                    .await?
                    .ok_or_else(|| ServiceError::InternalError("wallet vanished mid-update".into()));
            }
            warn!(supplier_id = %supplier_id, "Wallet version conflict while recomputing earnings; retrying");
        }

        let wallet = self.get_or_create(supplier_id).await?;
        Err(ServiceError::ConcurrencyConflict(wallet.id))
    }

    /// Increases available balance and journals the credit.
    #[instrument(skip(self))]
    pub async fn credit_available(
        &self,
        supplier_id: Uuid,
        amount: Decimal,
        description: &str,
        reference_id: Option<Uuid>,
    ) -> Result<supplier_wallet::Model, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "credit amount must be positive".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let mut wallet = self.get_or_create(supplier_id).await?;

        for _ in 0..MAX_VERSION_RETRIES {
            let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

            let result = WalletEntity::update_many()
                .col_expr(
                    supplier_wallet::Column::AvailableBalance,
                    Expr::col(supplier_wallet::Column::AvailableBalance).add(amount),
                )
                .col_expr(
                    supplier_wallet::Column::Version,
                    Expr::col(supplier_wallet::Column::Version).add(1),
                )
                .col_expr(
                    supplier_wallet::Column::UpdatedAt,
                    Expr::value(Some(Utc::now())),
                )
                .filter(supplier_wallet::Column::Id.eq(wallet.id))
                .filter(supplier_wallet::Column::Version.eq(wallet.version))
                .exec(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

            if result.rows_affected == 0 {
                txn.rollback().await.map_err(ServiceError::DatabaseError)?;
                warn!(wallet_id = %wallet.id, "Wallet version conflict on credit; retrying");
                wallet = Self::reload(db, wallet.id).await?;
                continue;
            }

            let updated = Self::reload(&txn, wallet.id).await?;
            Self::write_journal(
                &txn,
                wallet.id,
                WalletEntryType::SaleCredit,
                amount,
                updated.available_balance,
                description,
                reference_id,
            )
            .await?;

            txn.commit().await.map_err(ServiceError::DatabaseError)?;

            if let Some(event_sender) = &self.event_sender {
                if let Err(e) = event_sender
                    .send(Event::WalletCredited {
                        wallet_id: wallet.id,
                        amount,
                    })
                    .await
                {
                    warn!(error = %e, wallet_id = %wallet.id, "Failed to send wallet credited event");
                }
            }

            return Ok(updated);
        }

        Err(ServiceError::ConcurrencyConflict(wallet.id))
    }

    /// Decreases available balance, failing with InsufficientBalance when
    /// the wallet cannot cover the amount. The guard lives in the UPDATE's
    /// WHERE clause, so a concurrent debit cannot slip past it.
    #[instrument(skip(self))]
    pub async fn debit_available(
        &self,
        supplier_id: Uuid,
        amount: Decimal,
        description: &str,
        reference_id: Option<Uuid>,
    ) -> Result<supplier_wallet::Model, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "debit amount must be positive".to_string(),
            ));
        }

        let wallet = self
            .get_by_supplier(supplier_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Wallet for supplier {} not found", supplier_id))
            })?;

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let result = WalletEntity::update_many()
            .col_expr(
                supplier_wallet::Column::AvailableBalance,
                Expr::col(supplier_wallet::Column::AvailableBalance).sub(amount),
            )
            .col_expr(
                supplier_wallet::Column::Version,
                Expr::col(supplier_wallet::Column::Version).add(1),
            )
            .col_expr(
                supplier_wallet::Column::UpdatedAt,
                Expr::value(Some(Utc::now())),
            )
            .filter(supplier_wallet::Column::Id.eq(wallet.id))
            .filter(supplier_wallet::Column::AvailableBalance.gte(amount))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            txn.rollback().await.map_err(ServiceError::DatabaseError)?;
            let current = self.get_by_supplier(supplier_id).await?;
            let available = current.map(|w| w.available_balance).unwrap_or(Decimal::ZERO);
            return Err(ServiceError::InsufficientBalance(format!(
                "requested {}, available {}",
                amount, available
            )));
        }

        let updated = Self::reload(&txn, wallet.id).await?;
        Self::write_journal(
            &txn,
            wallet.id,
            WalletEntryType::Adjustment,
            -amount,
            updated.available_balance,
            description,
            reference_id,
        )
        .await?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::WalletDebited {
                    wallet_id: wallet.id,
                    amount,
                })
                .await
            {
                warn!(error = %e, wallet_id = %wallet.id, "Failed to send wallet debited event");
            }
        }

        Ok(updated)
    }

    /// Moves approved withdrawal funds from available into pending within
    /// the caller's transaction. The balance guard makes concurrent
    /// approvals first-come-first-served: the second one finds the funds
    /// gone and fails without touching the row.
    pub(crate) async fn hold_for_withdrawal(
        &self,
        txn: &DatabaseTransaction,
        wallet_id: Uuid,
        amount: Decimal,
        request_id: Uuid,
    ) -> Result<supplier_wallet::Model, ServiceError> {
        let result = WalletEntity::update_many()
            .col_expr(
                supplier_wallet::Column::AvailableBalance,
                Expr::col(supplier_wallet::Column::AvailableBalance).sub(amount),
            )
            .col_expr(
                supplier_wallet::Column::PendingBalance,
                Expr::col(supplier_wallet::Column::PendingBalance).add(amount),
            )
            .col_expr(
                supplier_wallet::Column::Version,
                Expr::col(supplier_wallet::Column::Version).add(1),
            )
            .col_expr(
                supplier_wallet::Column::UpdatedAt,
                Expr::value(Some(Utc::now())),
            )
            .filter(supplier_wallet::Column::Id.eq(wallet_id))
            .filter(supplier_wallet::Column::AvailableBalance.gte(amount))
            .exec(txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            let current = Self::reload_opt(txn, wallet_id).await?;
            let available = current.map(|w| w.available_balance).unwrap_or(Decimal::ZERO);
            return Err(ServiceError::InsufficientBalance(format!(
                "requested {}, available {}",
                amount, available
            )));
        }

        let updated = Self::reload(txn, wallet_id).await?;
        Self::write_journal(
            txn,
            wallet_id,
            WalletEntryType::WithdrawalHold,
            -amount,
            updated.available_balance,
            "Withdrawal approved; funds held for payout",
            Some(request_id),
        )
        .await?;

        Ok(updated)
    }

    /// Converts held withdrawal funds into paid-out funds within the
    /// caller's transaction.
    pub(crate) async fn settle_withdrawal(
        &self,
        txn: &DatabaseTransaction,
        wallet_id: Uuid,
        amount: Decimal,
        request_id: Uuid,
    ) -> Result<supplier_wallet::Model, ServiceError> {
        let result = WalletEntity::update_many()
            .col_expr(
                supplier_wallet::Column::PendingBalance,
                Expr::col(supplier_wallet::Column::PendingBalance).sub(amount),
            )
            .col_expr(
                supplier_wallet::Column::TotalWithdrawn,
                Expr::col(supplier_wallet::Column::TotalWithdrawn).add(amount),
            )
            .col_expr(
                supplier_wallet::Column::Version,
                Expr::col(supplier_wallet::Column::Version).add(1),
            )
            .col_expr(
                supplier_wallet::Column::UpdatedAt,
                Expr::value(Some(Utc::now())),
            )
            .filter(supplier_wallet::Column::Id.eq(wallet_id))
            .filter(supplier_wallet::Column::PendingBalance.gte(amount))
            .exec(txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::InvalidOperation(format!(
                "wallet {} holds less than the withdrawal amount in pending balance",
                wallet_id
            )));
        }

        let updated = Self::reload(txn, wallet_id).await?;
        Self::write_journal(
            txn,
            wallet_id,
            WalletEntryType::WithdrawalPayout,
            -amount,
            updated.available_balance,
            "Withdrawal paid out",
            Some(request_id),
        )
        .await?;

        Ok(updated)
    }

    /// Recent journal entries for a wallet, newest first.
    #[instrument(skip(self))]
    pub async fn list_transactions(
        &self,
        wallet_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<wallet_transaction::Model>, u64), ServiceError> {
        let db = &*self.db_pool;
        let paginator = wallet_transaction::Entity::find()
            .filter(wallet_transaction::Column::WalletId.eq(wallet_id))
            .order_by_desc(wallet_transaction::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let entries = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((entries, total))
    }

    async fn reload<C: ConnectionTrait>(
        conn: &C,
        wallet_id: Uuid,
    ) -> Result<supplier_wallet::Model, ServiceError> {
        Self::reload_opt(conn, wallet_id)
            .await?
            .ok_or_else(|| ServiceError::InternalError("wallet vanished mid-update".into()))
    }

    async fn reload_opt<C: ConnectionTrait>(
        conn: &C,
        wallet_id: Uuid,
    ) -> Result<Option<supplier_wallet::Model>, ServiceError> {
        WalletEntity::find_by_id(wallet_id)
            .one(conn)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn write_journal<C: ConnectionTrait>(
        conn: &C,
        wallet_id: Uuid,
        entry_type: WalletEntryType,
        amount: Decimal,
        balance_after: Decimal,
        description: &str,
        reference_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let entry = wallet_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            wallet_id: Set(wallet_id),
            transaction_type: Set(entry_type),
            amount: Set(amount),
            balance_after: Set(balance_after),
            description: Set(description.to_string()),
            reference_id: Set(reference_id),
            created_at: Set(Utc::now()),
        };
        entry
            .insert(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(())
    }
}
