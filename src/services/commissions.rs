use crate::{
    entities::sales_transaction_item,
    entities::supplier_payment,
    errors::ServiceError,
    services::payments::PaymentService,
    services::sales_ledger::{Period, SalesLedgerService},
    services::settings::SettingsService,
    services::suppliers::SupplierService,
    services::wallets::WalletService,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Settlement state of a supplier for a period.
///
/// Derivation order is a business rule: outstanding debt wins over an
/// in-flight withdrawal, which wins over fully-paid. Every surface that
/// shows a status goes through [`reconcile`] so they cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementStatus {
    Unpaid,
    Pending,
    Paid,
}

/// Per-supplier sums over one period's eligible line items. Derived fresh
/// from the sales ledger on every read and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CommissionTotals {
    pub supplier_id: Uuid,
    pub total_sales: Decimal,
    pub total_commission: Decimal,
    pub total_supplier_revenue: Decimal,
    pub transaction_count: u64,
    pub unit_count: i64,
}

impl CommissionTotals {
    fn zero(supplier_id: Uuid) -> Self {
        Self {
            supplier_id,
            total_sales: Decimal::ZERO,
            total_commission: Decimal::ZERO,
            total_supplier_revenue: Decimal::ZERO,
            transaction_count: 0,
            unit_count: 0,
        }
    }

    /// Commission ratio for display. Amounts are never recomputed from this
    /// figure: per-line rates may have changed mid-period, and the stored
    /// splits are the truth.
    pub fn effective_commission_rate(&self, default_rate: Decimal) -> Decimal {
        if self.total_sales > Decimal::ZERO {
            self.total_commission / self.total_sales
        } else {
            default_rate
        }
    }
}

/// Groups line items by supplier and sums the stored money splits. A
/// supplier with no eligible items in the input is absent from the output.
pub fn aggregate(items: &[sales_transaction_item::Model]) -> Vec<CommissionTotals> {
    let mut totals: HashMap<Uuid, CommissionTotals> = HashMap::new();
    let mut transactions: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();

    for item in items {
        let entry = totals
            .entry(item.supplier_id)
            .or_insert_with(|| CommissionTotals::zero(item.supplier_id));
        entry.total_sales += item.subtotal;
        entry.total_commission += item.commission_amount;
        entry.total_supplier_revenue += item.supplier_revenue;
        entry.unit_count += i64::from(item.quantity);

        transactions
            .entry(item.supplier_id)
            .or_default()
            .insert(item.transaction_id);
    }

    for (supplier_id, entry) in totals.iter_mut() {
        entry.transaction_count = transactions
            .get(supplier_id)
            .map(|t| t.len() as u64)
            .unwrap_or(0);
    }

    totals.into_values().collect()
}

/// Outcome of reconciling owed revenue against recorded payments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Settlement {
    /// Amount still owed, clamped at zero for display.
    pub outstanding: Decimal,
    /// Magnitude of any overpayment. A Some here flags a data error or a
    /// cross-period payment and is surfaced rather than silently clamped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overpayment: Option<Decimal>,
    pub total_paid: Decimal,
    pub status: SettlementStatus,
}

/// Derives outstanding balance and settlement status for one supplier's
/// period. First match wins: UNPAID while anything is owed, then PENDING
/// while a withdrawal is in flight, then PAID.
pub fn reconcile(
    total_supplier_revenue: Decimal,
    total_paid: Decimal,
    pending_balance: Decimal,
) -> Settlement {
    let raw_outstanding = total_supplier_revenue - total_paid;

    if raw_outstanding > Decimal::ZERO {
        return Settlement {
            outstanding: raw_outstanding,
            overpayment: None,
            total_paid,
            status: SettlementStatus::Unpaid,
        };
    }

    let overpayment = if raw_outstanding < Decimal::ZERO {
        Some(-raw_outstanding)
    } else {
        None
    };

    let status = if pending_balance > Decimal::ZERO {
        SettlementStatus::Pending
    } else {
        SettlementStatus::Paid
    };

    Settlement {
        outstanding: Decimal::ZERO,
        overpayment,
        total_paid,
        status,
    }
}

/// One row of the admin commission list: period totals joined with the
/// supplier's settlement state and payout coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommissionOverview {
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub total_sales: Decimal,
    /// Display-only effective rate; see [`CommissionTotals::effective_commission_rate`].
    pub commission_rate: Decimal,
    pub total_commission: Decimal,
    pub total_supplier_revenue: Decimal,
    pub outstanding: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overpayment: Option<Decimal>,
    pub total_paid: Decimal,
    pub status: SettlementStatus,
    pub transaction_count: u64,
    pub unit_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payment_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_holder: Option<String>,
}

/// Settlement answer for a single supplier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettlementView {
    pub supplier_id: Uuid,
    pub total_supplier_revenue: Decimal,
    pub total_paid: Decimal,
    pub outstanding: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overpayment: Option<Decimal>,
    pub status: SettlementStatus,
}

/// Threshold partition of unpaid suppliers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReadyToPay {
    pub minimum_payout_amount: Decimal,
    /// Outstanding at or above the minimum: batch these for payment.
    pub ready: Vec<CommissionOverview>,
    /// Positive outstanding below the minimum: carried to the next run.
    pub pending_threshold: Vec<CommissionOverview>,
}

/// Splits UNPAID suppliers into payable and below-threshold sets. Pure;
/// recomputed per query so a settings change takes effect immediately.
/// Suppliers with zero outstanding land in neither set.
pub fn classify(rows: Vec<CommissionOverview>, minimum_payout_amount: Decimal) -> ReadyToPay {
    let mut ready = Vec::new();
    let mut pending_threshold = Vec::new();

    for row in rows {
        if row.status != SettlementStatus::Unpaid || row.outstanding <= Decimal::ZERO {
            continue;
        }
        if row.outstanding >= minimum_payout_amount {
            ready.push(row);
        } else {
            pending_threshold.push(row);
        }
    }

    ReadyToPay {
        minimum_payout_amount,
        ready,
        pending_threshold,
    }
}

/// Read-side orchestration: pulls raw sales and payments, aggregates,
/// reconciles, and classifies. Holds no state of its own; every answer is
/// rebuilt from the stores on demand.
#[derive(Clone)]
pub struct CommissionService {
    ledger: Arc<SalesLedgerService>,
    suppliers: Arc<SupplierService>,
    payments: Arc<PaymentService>,
    wallets: Arc<WalletService>,
    settings: Arc<SettingsService>,
    default_commission_rate: Decimal,
}

impl CommissionService {
    pub fn new(
        ledger: Arc<SalesLedgerService>,
        suppliers: Arc<SupplierService>,
        payments: Arc<PaymentService>,
        wallets: Arc<WalletService>,
        settings: Arc<SettingsService>,
        default_commission_rate: Decimal,
    ) -> Self {
        Self {
            ledger,
            suppliers,
            payments,
            wallets,
            settings,
            default_commission_rate,
        }
    }

    /// Commission list for the period: one row per APPROVED supplier with
    /// eligible sales, settlement state included.
    #[instrument(skip(self))]
    pub async fn get_commission_overviews(
        &self,
        supplier_ids: Option<Vec<Uuid>>,
        period: Period,
    ) -> Result<Vec<CommissionOverview>, ServiceError> {
        let items = self
            .ledger
            .completed_items(supplier_ids.as_deref(), period)
            .await?;

        for item in &items {
            if !item.split_is_consistent() {
                warn!(
                    item_id = %item.id,
                    subtotal = %item.subtotal,
                    commission = %item.commission_amount,
                    revenue = %item.supplier_revenue,
                    "Line item money split drifts beyond rounding tolerance"
                );
            }
        }

        let totals = aggregate(&items);
        let ids: Vec<Uuid> = totals.iter().map(|t| t.supplier_id).collect();

        let suppliers: HashMap<Uuid, _> = self
            .suppliers
            .approved_by_ids(&ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut payments_by_supplier: HashMap<Uuid, Vec<supplier_payment::Model>> = HashMap::new();
        for payment in self.payments.completed_in_period(&ids, period).await? {
            payments_by_supplier
                .entry(payment.supplier_id)
                .or_default()
                .push(payment);
        }

        let pending_by_supplier: HashMap<Uuid, Decimal> = self
            .wallets
            .by_supplier_ids(&ids)
            .await?
            .into_iter()
            .map(|w| (w.supplier_id, w.pending_balance))
            .collect();

        let mut rows = Vec::with_capacity(totals.len());
        for total in totals {
            let Some(supplier) = suppliers.get(&total.supplier_id) else {
                // Sales recorded against a non-approved supplier stay out of
                // the payout list until onboarding resolves.
                continue;
            };

            let supplier_payments = payments_by_supplier
                .remove(&total.supplier_id)
                .unwrap_or_default();
            let total_paid: Decimal = supplier_payments.iter().map(|p| p.amount).sum();
            let latest = supplier_payments
                .iter()
                .max_by_key(|p| p.payment_date)
                .cloned();

            let pending_balance = pending_by_supplier
                .get(&total.supplier_id)
                .copied()
                .unwrap_or(Decimal::ZERO);

            let settlement = reconcile(total.total_supplier_revenue, total_paid, pending_balance);

            rows.push(CommissionOverview {
                supplier_id: total.supplier_id,
                supplier_name: supplier.business_name.clone(),
                total_sales: total.total_sales,
                commission_rate: total.effective_commission_rate(self.default_commission_rate),
                total_commission: total.total_commission,
                total_supplier_revenue: total.total_supplier_revenue,
                outstanding: settlement.outstanding,
                overpayment: settlement.overpayment,
                total_paid: settlement.total_paid,
                status: settlement.status,
                transaction_count: total.transaction_count,
                unit_count: total.unit_count,
                last_payment_date: latest.as_ref().map(|p| p.payment_date),
                last_payment_reference: latest.map(|p| p.payment_reference),
                bank_name: supplier.bank_name.clone(),
                bank_account_number: supplier.bank_account_number.clone(),
                bank_account_holder: supplier.bank_account_holder.clone(),
            });
        }

        Ok(rows)
    }

    /// Settlement status for one supplier over one period, computed from the
    /// same reconciliation every other surface uses.
    #[instrument(skip(self))]
    pub async fn get_settlement_status(
        &self,
        supplier_id: Uuid,
        period: Period,
    ) -> Result<SettlementView, ServiceError> {
        self.suppliers.require_supplier(supplier_id).await?;

        let ids = [supplier_id];
        let items = self.ledger.completed_items(Some(&ids), period).await?;
        let totals = aggregate(&items);
        let total_supplier_revenue = totals
            .first()
            .map(|t| t.total_supplier_revenue)
            .unwrap_or(Decimal::ZERO);

        let total_paid: Decimal = self
            .payments
            .completed_in_period(&ids, period)
            .await?
            .iter()
            .map(|p| p.amount)
            .sum();

        let pending_balance = self
            .wallets
            .get_by_supplier(supplier_id)
            .await?
            .map(|w| w.pending_balance)
            .unwrap_or(Decimal::ZERO);

        let settlement = reconcile(total_supplier_revenue, total_paid, pending_balance);

        Ok(SettlementView {
            supplier_id,
            total_supplier_revenue,
            total_paid,
            outstanding: settlement.outstanding,
            overpayment: settlement.overpayment,
            status: settlement.status,
        })
    }

    /// Partitions this period's unpaid suppliers by the configured payout
    /// threshold.
    #[instrument(skip(self))]
    pub async fn get_ready_to_pay(&self, period: Period) -> Result<ReadyToPay, ServiceError> {
        let rows = self.get_commission_overviews(None, period).await?;
        let settings = self.settings.get().await?;
        Ok(classify(rows, settings.minimum_payout_amount))
    }
}
