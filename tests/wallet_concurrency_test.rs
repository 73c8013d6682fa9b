mod common;

use common::{march, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use titipan_api::{
    entities::sales_transaction::{self, TransactionStatus},
    errors::ServiceError,
    services::withdrawals::CreateWithdrawalRequest,
};
use uuid::Uuid;

fn request(supplier_id: Uuid, amount: Decimal) -> CreateWithdrawalRequest {
    CreateWithdrawalRequest {
        supplier_id,
        amount,
        bank_name: "Mandiri".into(),
        account_number: "9876543210".into(),
        account_holder_name: "Pemilik Usaha".into(),
    }
}

#[tokio::test]
async fn lazy_wallet_creation_is_idempotent() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Roti Unyil").await;

    let first = app.services.wallets.get_or_create(supplier.id).await.unwrap();
    let second = app.services.wallets.get_or_create(supplier.id).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.available_balance, Decimal::ZERO);

    // Concurrent first-access from two tasks also converges on one wallet.
    let other = app.seed_supplier("Roti Gembong").await;
    let (a, b) = tokio::join!(
        app.services.wallets.get_or_create(other.id),
        app.services.wallets.get_or_create(other.id),
    );
    assert_eq!(a.unwrap().id, b.unwrap().id);
}

#[tokio::test]
async fn get_or_create_refuses_unknown_suppliers() {
    let app = TestApp::new().await;
    let err = app
        .services
        .wallets
        .get_or_create(Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn failed_debit_leaves_the_balance_untouched() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Kopi Tubruk").await;
    app.services
        .wallets
        .credit_available(supplier.id, dec!(30000), "Seed balance", None)
        .await
        .unwrap();

    let err = app
        .services
        .wallets
        .debit_available(supplier.id, dec!(45000), "Over-debit attempt", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientBalance(_)));

    let wallet = app
        .services
        .wallets
        .get_by_supplier(supplier.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.available_balance, dec!(30000));
}

#[tokio::test]
async fn concurrent_approvals_cannot_overdraw_the_wallet() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Juice Corner").await;
    app.services
        .wallets
        .credit_available(supplier.id, dec!(150000), "Seed balance", None)
        .await
        .unwrap();

    // Both requests individually fit the balance; together they do not.
    let first = app
        .services
        .withdrawals
        .create(request(supplier.id, dec!(100000)))
        .await
        .unwrap();
    let second = app
        .services
        .withdrawals
        .create(request(supplier.id, dec!(100000)))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        app.services.withdrawals.approve(first.id),
        app.services.withdrawals.approve(second.id),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one approval may win");

    let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(matches!(loser, ServiceError::InsufficientBalance(_)));

    let wallet = app
        .services
        .wallets
        .get_by_supplier(supplier.id)
        .await
        .unwrap()
        .unwrap();
    assert!(wallet.available_balance >= Decimal::ZERO);
    assert_eq!(wallet.available_balance, dec!(50000));
    assert_eq!(wallet.pending_balance, dec!(100000));
}

#[tokio::test]
async fn total_earned_is_recomputed_not_accumulated() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Donat Kampung").await;

    let transaction_id = app
        .seed_sale(
            supplier.id,
            dec!(550000),
            dec!(50000),
            TransactionStatus::Completed,
            march(10),
        )
        .await;
    app.seed_sale(
        supplier.id,
        dec!(110000),
        dec!(10000),
        TransactionStatus::Completed,
        march(11),
    )
    .await;

    let wallet = app
        .services
        .wallets
        .recompute_total_earned(supplier.id)
        .await
        .unwrap();
    assert_eq!(wallet.total_earned, dec!(600000));

    // A transaction later voided drops out of the sum on the next read;
    // no manual adjustment is involved.
    let voided = sales_transaction::Entity::find_by_id(transaction_id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: sales_transaction::ActiveModel = voided.into();
    active.status = Set(TransactionStatus::Refunded);
    active.update(&*app.db).await.unwrap();

    let wallet = app
        .services
        .wallets
        .recompute_total_earned(supplier.id)
        .await
        .unwrap();
    assert_eq!(wallet.total_earned, dec!(100000));
}

#[tokio::test]
async fn journal_records_every_balance_movement() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Lumpia Semarang").await;

    app.services
        .wallets
        .credit_available(supplier.id, dec!(120000), "Settled sales", None)
        .await
        .unwrap();
    let created = app
        .services
        .withdrawals
        .create(request(supplier.id, dec!(70000)))
        .await
        .unwrap();
    app.services.withdrawals.approve(created.id).await.unwrap();
    app.services.withdrawals.complete(created.id).await.unwrap();

    let wallet = app
        .services
        .wallets
        .get_by_supplier(supplier.id)
        .await
        .unwrap()
        .unwrap();
    let (entries, total) = app
        .services
        .wallets
        .list_transactions(wallet.id, 1, 20)
        .await
        .unwrap();

    // credit + hold + payout
    assert_eq!(total, 3);
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.reference_id.is_some() || e.amount > Decimal::ZERO));
}
