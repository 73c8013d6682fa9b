mod common;

use chrono::TimeZone;
use common::{march, march_2025, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use titipan_api::{
    entities::sales_transaction::TransactionStatus,
    services::commissions::SettlementStatus,
    services::payments::RecordPaymentRequest,
    services::settings::UpdateSettingsRequest,
    services::withdrawals::CreateWithdrawalRequest,
};

fn payment(supplier_id: uuid::Uuid, amount: Decimal, day: u32) -> RecordPaymentRequest {
    RecordPaymentRequest {
        supplier_id,
        amount,
        payment_reference: None,
        payment_date: Some(march(day)),
        payment_method: None,
        notes: None,
        proof_url: None,
        period_start: None,
        period_end: None,
        created_by: None,
    }
}

#[tokio::test]
async fn partial_then_full_payment_settles_the_period() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Kue Basah Ibu").await;

    // 1,100,000 gross with 100,000 commission: 1,000,000 owed to the supplier.
    app.seed_completed_march_sale(supplier.id, dec!(1100000), dec!(100000))
        .await;

    let view = app
        .services
        .commissions
        .get_settlement_status(supplier.id, march_2025())
        .await
        .unwrap();
    assert_eq!(view.total_supplier_revenue, dec!(1000000));
    assert_eq!(view.outstanding, dec!(1000000));
    assert_eq!(view.status, SettlementStatus::Unpaid);

    app.services
        .payments
        .record_payment(payment(supplier.id, dec!(600000), 20))
        .await
        .unwrap();

    let view = app
        .services
        .commissions
        .get_settlement_status(supplier.id, march_2025())
        .await
        .unwrap();
    assert_eq!(view.outstanding, dec!(400000));
    assert_eq!(view.status, SettlementStatus::Unpaid);

    app.services
        .payments
        .record_payment(payment(supplier.id, dec!(400000), 25))
        .await
        .unwrap();

    let view = app
        .services
        .commissions
        .get_settlement_status(supplier.id, march_2025())
        .await
        .unwrap();
    assert_eq!(view.outstanding, Decimal::ZERO);
    assert_eq!(view.overpayment, None);
    assert_eq!(view.status, SettlementStatus::Paid);
}

#[tokio::test]
async fn recording_a_payment_lowers_outstanding_monotonically() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Dapur Melati").await;
    app.seed_completed_march_sale(supplier.id, dec!(550000), dec!(55000))
        .await;

    let before = app
        .services
        .commissions
        .get_settlement_status(supplier.id, march_2025())
        .await
        .unwrap();

    app.services
        .payments
        .record_payment(payment(supplier.id, dec!(120000), 18))
        .await
        .unwrap();

    let after = app
        .services
        .commissions
        .get_settlement_status(supplier.id, march_2025())
        .await
        .unwrap();

    assert!(after.outstanding < before.outstanding);
}

#[tokio::test]
async fn unpaid_outranks_an_inflight_withdrawal() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Warung Tiga").await;
    app.seed_completed_march_sale(supplier.id, dec!(550000), dec!(50000))
        .await;

    // Give the supplier withdrawable cash and put a withdrawal in flight.
    app.services
        .wallets
        .credit_available(supplier.id, dec!(200000), "Settled sales March", None)
        .await
        .unwrap();
    let request = app
        .services
        .withdrawals
        .create(CreateWithdrawalRequest {
            supplier_id: supplier.id,
            amount: dec!(60000),
            bank_name: "BCA".into(),
            account_number: "1234567890".into(),
            account_holder_name: "Warung Tiga".into(),
        })
        .await
        .unwrap();
    app.services.withdrawals.approve(request.id).await.unwrap();

    // Debt still outstanding: the pending withdrawal must not mask it.
    let view = app
        .services
        .commissions
        .get_settlement_status(supplier.id, march_2025())
        .await
        .unwrap();
    assert_eq!(view.status, SettlementStatus::Unpaid);
    assert_eq!(view.outstanding, dec!(500000));

    // Fully paid: the same in-flight withdrawal now surfaces as PENDING.
    app.services
        .payments
        .record_payment(payment(supplier.id, dec!(500000), 22))
        .await
        .unwrap();

    let view = app
        .services
        .commissions
        .get_settlement_status(supplier.id, march_2025())
        .await
        .unwrap();
    assert_eq!(view.outstanding, Decimal::ZERO);
    assert_eq!(view.status, SettlementStatus::Pending);
}

#[tokio::test]
async fn overpayment_is_surfaced_as_a_diagnostic() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Sambal Bu Rina").await;
    app.seed_completed_march_sale(supplier.id, dec!(1100000), dec!(100000))
        .await;

    app.services
        .payments
        .record_payment(payment(supplier.id, dec!(1200000), 21))
        .await
        .unwrap();

    let view = app
        .services
        .commissions
        .get_settlement_status(supplier.id, march_2025())
        .await
        .unwrap();
    assert_eq!(view.outstanding, Decimal::ZERO);
    assert_eq!(view.overpayment, Some(dec!(200000)));
    assert_eq!(view.status, SettlementStatus::Paid);
}

#[tokio::test]
async fn only_completed_transactions_feed_the_ledger() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Keripik Pak Budi").await;

    app.seed_completed_march_sale(supplier.id, dec!(300000), dec!(30000))
        .await;
    app.seed_sale(
        supplier.id,
        dec!(900000),
        dec!(90000),
        TransactionStatus::Pending,
        march(15),
    )
    .await;
    app.seed_sale(
        supplier.id,
        dec!(700000),
        dec!(70000),
        TransactionStatus::Cancelled,
        march(16),
    )
    .await;

    let view = app
        .services
        .commissions
        .get_settlement_status(supplier.id, march_2025())
        .await
        .unwrap();
    assert_eq!(view.total_supplier_revenue, dec!(270000));
}

#[tokio::test]
async fn overview_rows_cover_only_suppliers_with_sales() {
    let app = TestApp::new().await;
    let with_sales = app.seed_supplier("Aneka Gorengan").await;
    let _without_sales = app.seed_supplier("Toko Sepi").await;

    app.seed_completed_march_sale(with_sales.id, dec!(220000), dec!(22000))
        .await;

    let rows = app
        .services
        .commissions
        .get_commission_overviews(None, march_2025())
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.supplier_id, with_sales.id);
    assert_eq!(row.supplier_name, "Aneka Gorengan");
    assert_eq!(row.total_sales, dec!(220000));
    assert_eq!(row.total_commission, dec!(22000));
    assert_eq!(row.total_supplier_revenue, dec!(198000));
    assert_eq!(row.commission_rate, dec!(0.10));
    assert_eq!(row.transaction_count, 1);
    assert_eq!(row.unit_count, 1);
}

#[tokio::test]
async fn ready_to_pay_partitions_by_configured_threshold() {
    let app = TestApp::new().await;

    app.services
        .settings
        .update(UpdateSettingsRequest {
            minimum_payout_amount: Some(dec!(100000)),
            minimum_withdrawal_amount: None,
            payment_schedule: None,
            allow_partial_payment: None,
        })
        .await
        .unwrap();

    let ready_supplier = app.seed_supplier("Supplier A").await;
    let below_supplier = app.seed_supplier("Supplier B").await;
    let settled_supplier = app.seed_supplier("Supplier C").await;

    // A: 150,000 outstanding; B: 40,000 outstanding; C: settled in full.
    app.seed_completed_march_sale(ready_supplier.id, dec!(165000), dec!(15000))
        .await;
    app.seed_completed_march_sale(below_supplier.id, dec!(44000), dec!(4000))
        .await;
    app.seed_completed_march_sale(settled_supplier.id, dec!(88000), dec!(8000))
        .await;
    app.services
        .payments
        .record_payment(payment(settled_supplier.id, dec!(80000), 19))
        .await
        .unwrap();

    let partition = app
        .services
        .commissions
        .get_ready_to_pay(march_2025())
        .await
        .unwrap();

    assert_eq!(partition.minimum_payout_amount, dec!(100000));
    assert_eq!(partition.ready.len(), 1);
    assert_eq!(partition.ready[0].supplier_id, ready_supplier.id);
    assert_eq!(partition.ready[0].outstanding, dec!(150000));
    assert_eq!(partition.pending_threshold.len(), 1);
    assert_eq!(partition.pending_threshold[0].supplier_id, below_supplier.id);
    assert_eq!(partition.pending_threshold[0].outstanding, dec!(40000));
}

#[tokio::test]
async fn payments_outside_the_period_do_not_count() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Catering Hj. Nur").await;
    app.seed_completed_march_sale(supplier.id, dec!(330000), dec!(30000))
        .await;

    // Paid in April: March reconciliation must not see it.
    let mut request = payment(supplier.id, dec!(300000), 1);
    request.payment_date = Some(chrono::Utc.with_ymd_and_hms(2025, 4, 2, 9, 0, 0).unwrap());
    app.services.payments.record_payment(request).await.unwrap();

    let view = app
        .services
        .commissions
        .get_settlement_status(supplier.id, march_2025())
        .await
        .unwrap();
    assert_eq!(view.outstanding, dec!(300000));
    assert_eq!(view.status, SettlementStatus::Unpaid);
}
