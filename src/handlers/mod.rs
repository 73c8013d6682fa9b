pub mod commissions;
pub mod common;
pub mod payments;
pub mod settings;
pub mod wallets;
pub mod withdrawals;

use crate::db::DbPool;
use crate::events::EventSender;
use rust_decimal::Decimal;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub sales_ledger: Arc<crate::services::sales_ledger::SalesLedgerService>,
    pub suppliers: Arc<crate::services::suppliers::SupplierService>,
    pub settings: Arc<crate::services::settings::SettingsService>,
    pub wallets: Arc<crate::services::wallets::WalletService>,
    pub withdrawals: Arc<crate::services::withdrawals::WithdrawalService>,
    pub payments: Arc<crate::services::payments::PaymentService>,
    pub commissions: Arc<crate::services::commissions::CommissionService>,
}

impl AppServices {
    /// Wires the service graph over one connection pool and event channel.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        default_commission_rate: Decimal,
    ) -> Self {
        let sales_ledger = Arc::new(crate::services::sales_ledger::SalesLedgerService::new(
            db_pool.clone(),
        ));
        let suppliers = Arc::new(crate::services::suppliers::SupplierService::new(
            db_pool.clone(),
        ));
        let settings = Arc::new(crate::services::settings::SettingsService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let wallets = Arc::new(crate::services::wallets::WalletService::new(
            db_pool.clone(),
            sales_ledger.clone(),
            event_sender.clone(),
        ));
        let withdrawals = Arc::new(crate::services::withdrawals::WithdrawalService::new(
            db_pool.clone(),
            wallets.clone(),
            settings.clone(),
            event_sender.clone(),
        ));
        let payments = Arc::new(crate::services::payments::PaymentService::new(
            db_pool,
            suppliers.clone(),
            wallets.clone(),
            event_sender,
        ));
        let commissions = Arc::new(crate::services::commissions::CommissionService::new(
            sales_ledger.clone(),
            suppliers.clone(),
            payments.clone(),
            wallets.clone(),
            settings.clone(),
            default_commission_rate,
        ));

        Self {
            sales_ledger,
            suppliers,
            settings,
            wallets,
            withdrawals,
            payments,
            commissions,
        }
    }
}
