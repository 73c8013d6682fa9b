use crate::{
    db::DbPool,
    entities::supplier_payment::{self, Entity as PaymentEntity, PaymentMethod, PaymentStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    services::sales_ledger::Period,
    services::suppliers::SupplierService,
    services::wallets::WalletService,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub supplier_id: Uuid,
    pub amount: Decimal,
    /// Externally-reserved reference; auto-generated when omitted.
    pub payment_reference: Option<String>,
    /// Defaults to now when omitted.
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    /// Already-uploaded proof location; attachment is best-effort.
    pub proof_url: Option<String>,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    /// Recording admin, when the caller knows it.
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct RecordedPayment {
    #[serde(flatten)]
    pub payment: supplier_payment::Model,
    /// Present when the payment committed but the proof attachment failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_warning: Option<String>,
}

/// Recorder of admin-initiated supplier payouts.
///
/// A payment row reduces the supplier's period outstanding in future
/// reconciliations; it deliberately never touches wallet.available_balance,
/// which tracks earned-and-unwithdrawn cash rather than settlement debt.
#[derive(Clone)]
pub struct PaymentService {
    db_pool: Arc<DbPool>,
    suppliers: Arc<SupplierService>,
    wallets: Arc<WalletService>,
    event_sender: Option<Arc<EventSender>>,
}

impl PaymentService {
    pub fn new(
        db_pool: Arc<DbPool>,
        suppliers: Arc<SupplierService>,
        wallets: Arc<WalletService>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db_pool,
            suppliers,
            wallets,
            event_sender,
        }
    }

    /// Records a COMPLETED payment against a supplier.
    ///
    /// The row is immutable once inserted; when the optional proof
    /// attachment fails afterwards, the payment stands and the failure is
    /// reported as a warning instead of rolling back.
    #[instrument(skip(self, request), fields(supplier_id = %request.supplier_id, amount = %request.amount))]
    pub async fn record_payment(
        &self,
        request: RecordPaymentRequest,
    ) -> Result<RecordedPayment, ServiceError> {
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "payment amount must be positive".to_string(),
            ));
        }
        if let Some(reference) = &request.payment_reference {
            if reference.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "payment reference must not be empty when provided".to_string(),
                ));
            }
        }

        let supplier = self.suppliers.require_supplier(request.supplier_id).await?;
        let payment_date = request.payment_date.unwrap_or_else(Utc::now);
        let reference = match request.payment_reference {
            Some(reference) => reference.trim().to_string(),
            None => generate_payment_reference(payment_date, &supplier.initials()),
        };

        // Wallet linkage is informational; a supplier who never opened a
        // wallet still gets paid.
        let wallet_id = self
            .wallets
            .get_by_supplier(request.supplier_id)
            .await?
            .map(|w| w.id);

        let db = &*self.db_pool;
        let payment_id = Uuid::new_v4();
        let active = supplier_payment::ActiveModel {
            id: Set(payment_id),
            supplier_id: Set(request.supplier_id),
            wallet_id: Set(wallet_id),
            amount: Set(request.amount),
            payment_reference: Set(reference.clone()),
            payment_date: Set(payment_date),
            payment_method: Set(request.payment_method.unwrap_or(PaymentMethod::BankTransfer)),
            bank_name: Set(supplier.bank_name.clone()),
            bank_account_number: Set(supplier.bank_account_number.clone()),
            bank_account_holder: Set(supplier.bank_account_holder.clone()),
            payment_proof_url: Set(None),
            notes: Set(request.notes),
            status: Set(PaymentStatus::Completed),
            period_start: Set(request.period_start),
            period_end: Set(request.period_end),
            created_by: Set(request.created_by),
            created_at: Set(Utc::now()),
        };

        let payment = active.insert(db).await.map_err(|e| {
            error!(error = %e, supplier_id = %request.supplier_id, "Failed to record payment");
            ServiceError::DatabaseError(e)
        })?;

        info!(payment_id = %payment.id, reference = %reference, "Payment recorded");

        // The proof attachment rides behind the committed row; its failure
        // must never invalidate the payment.
        let (payment, proof_warning) = match request.proof_url {
            Some(proof_url) => match self.attach_proof(payment.id, &proof_url).await {
                Ok(updated) => (updated, None),
                Err(e) => {
                    warn!(error = %e, payment_id = %payment.id, "Payment recorded but proof attachment failed");
                    (
                        payment,
                        Some(format!("payment recorded but proof attachment failed: {}", e)),
                    )
                }
            },
            None => (payment, None),
        };

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::PaymentRecorded {
                    payment_id: payment.id,
                    supplier_id: payment.supplier_id,
                    amount: payment.amount,
                    payment_date: payment.payment_date,
                })
                .await
            {
                warn!(error = %e, payment_id = %payment.id, "Failed to send payment recorded event");
            }
        }

        Ok(RecordedPayment {
            payment,
            proof_warning,
        })
    }

    /// Attaches (or replaces) the transfer proof on an existing payment.
    /// This is the one field a COMPLETED row may gain after the fact.
    #[instrument(skip(self, proof_url))]
    pub async fn attach_proof(
        &self,
        payment_id: Uuid,
        proof_url: &str,
    ) -> Result<supplier_payment::Model, ServiceError> {
        if proof_url.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "proof URL must not be empty".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let payment = PaymentEntity::find_by_id(payment_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Payment with ID {} not found", payment_id))
            })?;

        let mut active: supplier_payment::ActiveModel = payment.into();
        active.payment_proof_url = Set(Some(proof_url.trim().to_string()));
        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    /// Gets a payment by ID
    #[instrument(skip(self))]
    pub async fn get_payment(
        &self,
        payment_id: Uuid,
    ) -> Result<Option<supplier_payment::Model>, ServiceError> {
        let db = &*self.db_pool;
        PaymentEntity::find_by_id(payment_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Payment history, newest first, optionally narrowed to one supplier
    /// and a payment-date period.
    #[instrument(skip(self))]
    pub async fn list_payments(
        &self,
        supplier_id: Option<Uuid>,
        period: Option<Period>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<supplier_payment::Model>, u64), ServiceError> {
        let db = &*self.db_pool;

        let mut query =
            PaymentEntity::find().order_by_desc(supplier_payment::Column::PaymentDate);
        if let Some(supplier_id) = supplier_id {
            query = query.filter(supplier_payment::Column::SupplierId.eq(supplier_id));
        }
        if let Some(period) = period {
            query = query
                .filter(supplier_payment::Column::PaymentDate.gte(period.start))
                .filter(supplier_payment::Column::PaymentDate.lt(period.end));
        }

        let paginator = query.paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let payments = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok((payments, total))
    }

    /// All COMPLETED payments whose payment_date falls in the period, for
    /// the given suppliers. Used by reconciliation.
    pub(crate) async fn completed_in_period(
        &self,
        supplier_ids: &[Uuid],
        period: Period,
    ) -> Result<Vec<supplier_payment::Model>, ServiceError> {
        if supplier_ids.is_empty() {
            return Ok(Vec::new());
        }

        let db = &*self.db_pool;
        PaymentEntity::find()
            .filter(supplier_payment::Column::SupplierId.is_in(supplier_ids.iter().copied()))
            .filter(supplier_payment::Column::Status.eq(PaymentStatus::Completed))
            .filter(supplier_payment::Column::PaymentDate.gte(period.start))
            .filter(supplier_payment::Column::PaymentDate.lt(period.end))
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to read payments for reconciliation");
                ServiceError::SourceUnavailable(format!("payment read failed: {}", e))
            })
    }
}

/// Builds a reference like TRF-20250301-483-KBI: transfer date, a random
/// three-digit discriminator, and the supplier's initials. Uniqueness is
/// best-effort; the unique index on the column catches the rare collision.
pub fn generate_payment_reference(date: DateTime<Utc>, initials: &str) -> String {
    let discriminator: u16 = rand::thread_rng().gen_range(100..1000);
    format!(
        "TRF-{}-{:03}-{}",
        date.format("%Y%m%d"),
        discriminator,
        initials
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn reference_format_is_stable() {
        let date = Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap();
        let reference = generate_payment_reference(date, "KBI");

        let parts: Vec<&str> = reference.split('-').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "TRF");
        assert_eq!(parts[1], "20250301");
        assert_eq!(parts[2].len(), 3);
        let discriminator: u16 = parts[2].parse().expect("numeric discriminator");
        assert!((100..1000).contains(&discriminator));
        assert_eq!(parts[3], "KBI");
    }

    #[test]
    fn reference_handles_short_initials() {
        let date = Utc.with_ymd_and_hms(2025, 12, 31, 23, 0, 0).unwrap();
        let reference = generate_payment_reference(date, "W");
        assert!(reference.starts_with("TRF-20251231-"));
        assert!(reference.ends_with("-W"));
    }
}
