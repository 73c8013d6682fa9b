use crate::{
    db::DbPool,
    entities::withdrawal_request::{self, Entity as WithdrawalEntity, WithdrawalStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    services::settings::SettingsService,
    services::wallets::WalletService,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateWithdrawalRequest {
    pub supplier_id: Uuid,
    pub amount: Decimal,
    #[validate(length(min = 1, message = "Bank name is required"))]
    pub bank_name: String,
    #[validate(length(min = 1, message = "Account number is required"))]
    pub account_number: String,
    #[validate(length(min = 1, message = "Account holder name is required"))]
    pub account_holder_name: String,
}

/// Supplier-initiated withdrawals against available balance.
///
/// Lifecycle: PENDING -> APPROVED -> COMPLETED, or PENDING -> REJECTED.
/// Creation never touches balances; funds are reserved when an admin
/// approves and leave the wallet for good at completion.
#[derive(Clone)]
pub struct WithdrawalService {
    db_pool: Arc<DbPool>,
    wallets: Arc<WalletService>,
    settings: Arc<SettingsService>,
    event_sender: Option<Arc<EventSender>>,
}

impl WithdrawalService {
    pub fn new(
        db_pool: Arc<DbPool>,
        wallets: Arc<WalletService>,
        settings: Arc<SettingsService>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db_pool,
            wallets,
            settings,
            event_sender,
        }
    }

    /// Creates a PENDING withdrawal request.
    ///
    /// Preconditions are checked in order and the first unmet one is
    /// reported: positive amount, configured minimum, available balance
    /// ceiling, complete bank coordinates.
    #[instrument(skip(self, request), fields(supplier_id = %request.supplier_id, amount = %request.amount))]
    pub async fn create(
        &self,
        request: CreateWithdrawalRequest,
    ) -> Result<withdrawal_request::Model, ServiceError> {
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "withdrawal amount must be positive".to_string(),
            ));
        }

        let settings = self.settings.get().await?;
        if request.amount < settings.minimum_withdrawal_amount {
            return Err(ServiceError::ValidationError(format!(
                "withdrawal amount {} is below the minimum of {}",
                request.amount, settings.minimum_withdrawal_amount
            )));
        }

        let wallet = self.wallets.get_or_create(request.supplier_id).await?;
        if request.amount > wallet.available_balance {
            return Err(ServiceError::ValidationError(format!(
                "withdrawal amount {} exceeds available balance {}",
                request.amount, wallet.available_balance
            )));
        }

        for (value, field) in [
            (&request.bank_name, "bank_name"),
            (&request.account_number, "account_number"),
            (&request.account_holder_name, "account_holder_name"),
        ] {
            if value.trim().is_empty() {
                return Err(ServiceError::ValidationError(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }

        let db = &*self.db_pool;
        let active = withdrawal_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            supplier_id: Set(request.supplier_id),
            wallet_id: Set(wallet.id),
            amount: Set(request.amount),
            bank_name: Set(request.bank_name.trim().to_string()),
            account_number: Set(request.account_number.trim().to_string()),
            account_holder_name: Set(request.account_holder_name.trim().to_string()),
            status: Set(WithdrawalStatus::Pending),
            requested_at: Set(Utc::now()),
            reviewed_at: Set(None),
            rejection_reason: Set(None),
        };

        let created = active.insert(db).await.map_err(|e| {
            error!(error = %e, supplier_id = %request.supplier_id, "Failed to create withdrawal request");
            ServiceError::DatabaseError(e)
        })?;

        info!(request_id = %created.id, supplier_id = %request.supplier_id, "Withdrawal requested");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::WithdrawalRequested(created.id))
                .await
            {
                warn!(error = %e, request_id = %created.id, "Failed to send withdrawal requested event");
            }
        }

        Ok(created)
    }

    /// Approves a PENDING request: reserves the amount out of available
    /// balance (available -> pending) and stamps the review. The status
    /// change and the hold commit or roll back together.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        request_id: Uuid,
    ) -> Result<withdrawal_request::Model, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let request = WithdrawalEntity::find_by_id(request_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Withdrawal request {} not found", request_id))
            })?;

        if !request.status.can_transition_to(WithdrawalStatus::Approved) {
            txn.rollback().await.map_err(ServiceError::DatabaseError)?;
            return Err(ServiceError::InvalidStatus(format!(
                "withdrawal request {} is {:?}, not PENDING",
                request_id, request.status
            )));
        }

        // The hold can still fail here: another approval may have drained
        // the wallet since this request was created.
        match self
            .wallets
            .hold_for_withdrawal(&txn, request.wallet_id, request.amount, request.id)
            .await
        {
            Ok(_) => {}
            Err(e) => {
                txn.rollback().await.map_err(ServiceError::DatabaseError)?;
                return Err(e);
            }
        }

        let amount = request.amount;
        let mut active: withdrawal_request::ActiveModel = request.into();
        active.status = Set(WithdrawalStatus::Approved);
        active.reviewed_at = Set(Some(Utc::now()));
        let approved = active.update(&txn).await.map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(request_id = %approved.id, amount = %amount, "Withdrawal approved");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::WithdrawalApproved {
                    request_id: approved.id,
                    amount,
                })
                .await
            {
                warn!(error = %e, request_id = %approved.id, "Failed to send withdrawal approved event");
            }
        }

        Ok(approved)
    }

    /// Marks an APPROVED request as COMPLETED once the transfer is confirmed:
    /// held funds move from pending into the lifetime withdrawn total.
    #[instrument(skip(self))]
    pub async fn complete(
        &self,
        request_id: Uuid,
    ) -> Result<withdrawal_request::Model, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let request = WithdrawalEntity::find_by_id(request_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Withdrawal request {} not found", request_id))
            })?;

        if !request.status.can_transition_to(WithdrawalStatus::Completed) {
            txn.rollback().await.map_err(ServiceError::DatabaseError)?;
            return Err(ServiceError::InvalidStatus(format!(
                "withdrawal request {} is {:?}, not APPROVED",
                request_id, request.status
            )));
        }

        match self
            .wallets
            .settle_withdrawal(&txn, request.wallet_id, request.amount, request.id)
            .await
        {
            Ok(_) => {}
            Err(e) => {
                txn.rollback().await.map_err(ServiceError::DatabaseError)?;
                return Err(e);
            }
        }

        let mut active: withdrawal_request::ActiveModel = request.into();
        active.status = Set(WithdrawalStatus::Completed);
        let completed = active.update(&txn).await.map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(request_id = %completed.id, "Withdrawal completed");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::WithdrawalCompleted(completed.id))
                .await
            {
                warn!(error = %e, request_id = %completed.id, "Failed to send withdrawal completed event");
            }
        }

        Ok(completed)
    }

    /// Rejects a PENDING request with a mandatory reason. Balances are
    /// untouched since nothing was reserved at creation.
    #[instrument(skip(self, reason))]
    pub async fn reject(
        &self,
        request_id: Uuid,
        reason: &str,
    ) -> Result<withdrawal_request::Model, ServiceError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ServiceError::ValidationError(
                "rejection reason must not be empty".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let request = WithdrawalEntity::find_by_id(request_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Withdrawal request {} not found", request_id))
            })?;

        if !request.status.can_transition_to(WithdrawalStatus::Rejected) {
            txn.rollback().await.map_err(ServiceError::DatabaseError)?;
            return Err(ServiceError::InvalidStatus(format!(
                "withdrawal request {} is {:?}, not PENDING",
                request_id, request.status
            )));
        }

        let mut active: withdrawal_request::ActiveModel = request.into();
        active.status = Set(WithdrawalStatus::Rejected);
        active.reviewed_at = Set(Some(Utc::now()));
        active.rejection_reason = Set(Some(reason.to_string()));
        let rejected = active.update(&txn).await.map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(request_id = %rejected.id, "Withdrawal rejected");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::WithdrawalRejected {
                    request_id: rejected.id,
                    reason: reason.to_string(),
                })
                .await
            {
                warn!(error = %e, request_id = %rejected.id, "Failed to send withdrawal rejected event");
            }
        }

        Ok(rejected)
    }

    /// Gets a withdrawal request by ID
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        request_id: Uuid,
    ) -> Result<Option<withdrawal_request::Model>, ServiceError> {
        let db = &*self.db_pool;
        WithdrawalEntity::find_by_id(request_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Lists withdrawal requests, newest first, optionally filtered by
    /// supplier and status.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        supplier_id: Option<Uuid>,
        status: Option<WithdrawalStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<withdrawal_request::Model>, u64), ServiceError> {
        let db = &*self.db_pool;

        let mut query = WithdrawalEntity::find()
            .order_by_desc(withdrawal_request::Column::RequestedAt);
        if let Some(supplier_id) = supplier_id {
            query = query.filter(withdrawal_request::Column::SupplierId.eq(supplier_id));
        }
        if let Some(status) = status {
            query = query.filter(withdrawal_request::Column::Status.eq(status));
        }

        let paginator = query.paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let requests = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((requests, total))
    }
}
