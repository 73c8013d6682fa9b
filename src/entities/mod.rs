pub mod payment_settings;
pub mod sales_transaction;
pub mod sales_transaction_item;
pub mod supplier;
pub mod supplier_payment;
pub mod supplier_wallet;
pub mod wallet_transaction;
pub mod withdrawal_request;
