mod common;

use common::{march, march_2025, TestApp};
use rust_decimal_macros::dec;
use titipan_api::{
    entities::supplier_payment::{PaymentMethod, PaymentStatus},
    errors::ServiceError,
    services::payments::RecordPaymentRequest,
    services::sales_ledger::Period,
};
use uuid::Uuid;

fn base_request(supplier_id: Uuid) -> RecordPaymentRequest {
    RecordPaymentRequest {
        supplier_id,
        amount: dec!(250000),
        payment_reference: None,
        payment_date: Some(march(20)),
        payment_method: None,
        notes: Some("Pembayaran komisi Maret".into()),
        proof_url: None,
        period_start: Some(march_2025().start),
        period_end: Some(march_2025().end),
        created_by: Some(Uuid::new_v4()),
    }
}

#[tokio::test]
async fn generated_reference_carries_date_and_initials() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Kue Basah Ibu").await;

    let recorded = app
        .services
        .payments
        .record_payment(base_request(supplier.id))
        .await
        .unwrap();

    let reference = &recorded.payment.payment_reference;
    assert!(
        reference.starts_with("TRF-20250320-"),
        "unexpected reference {}",
        reference
    );
    assert!(reference.ends_with("-KBI"));
    assert_eq!(recorded.payment.status, PaymentStatus::Completed);
    assert_eq!(recorded.payment.payment_method, PaymentMethod::BankTransfer);
    // Bank coordinates are snapshotted from the supplier at recording time.
    assert_eq!(recorded.payment.bank_name.as_deref(), Some("BCA"));
    assert!(recorded.proof_warning.is_none());
}

#[tokio::test]
async fn explicit_reference_is_kept_verbatim() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Dapur Melati").await;

    let mut request = base_request(supplier.id);
    request.payment_reference = Some("TRF-MANUAL-001".into());
    let recorded = app.services.payments.record_payment(request).await.unwrap();
    assert_eq!(recorded.payment.payment_reference, "TRF-MANUAL-001");
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Sate Taichan").await;

    let mut request = base_request(supplier.id);
    request.amount = dec!(0);
    let err = app
        .services
        .payments
        .record_payment(request)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn unknown_supplier_is_a_not_found() {
    let app = TestApp::new().await;
    let err = app
        .services
        .payments
        .record_payment(base_request(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn payments_never_touch_the_wallet_balance() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Mie Ayam Pangsit").await;
    app.services
        .wallets
        .credit_available(supplier.id, dec!(90000), "Seed balance", None)
        .await
        .unwrap();

    app.services
        .payments
        .record_payment(base_request(supplier.id))
        .await
        .unwrap();

    let wallet = app
        .services
        .wallets
        .get_by_supplier(supplier.id)
        .await
        .unwrap()
        .unwrap();
    // Settlement debt and withdrawable cash are separate pools.
    assert_eq!(wallet.available_balance, dec!(90000));
}

#[tokio::test]
async fn proof_attaches_after_the_row_commits() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Bubur Ayam 99").await;

    let mut request = base_request(supplier.id);
    request.proof_url = Some("https://storage.example/proofs/trf-123.jpg".into());
    let recorded = app.services.payments.record_payment(request).await.unwrap();

    assert_eq!(
        recorded.payment.payment_proof_url.as_deref(),
        Some("https://storage.example/proofs/trf-123.jpg")
    );
    assert!(recorded.proof_warning.is_none());

    let err = app
        .services
        .payments
        .attach_proof(Uuid::new_v4(), "https://storage.example/nope.jpg")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = app
        .services
        .payments
        .attach_proof(recorded.payment.id, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn history_filters_by_supplier_and_period() {
    let app = TestApp::new().await;
    let paid_supplier = app.seed_supplier("Gado Gado Boplo").await;
    let other_supplier = app.seed_supplier("Ketoprak Ciragil").await;

    app.services
        .payments
        .record_payment(base_request(paid_supplier.id))
        .await
        .unwrap();
    app.services
        .payments
        .record_payment(base_request(other_supplier.id))
        .await
        .unwrap();

    let (rows, total) = app
        .services
        .payments
        .list_payments(Some(paid_supplier.id), Some(march_2025()), 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].supplier_id, paid_supplier.id);

    // A disjoint period sees nothing.
    let april = Period::new(march_2025().end, march(31) + chrono::Duration::days(40)).unwrap();
    let (rows, total) = app
        .services
        .payments
        .list_payments(Some(paid_supplier.id), Some(april), 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 0);
    assert!(rows.is_empty());
}
