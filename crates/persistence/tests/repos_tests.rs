//! Repository tests against an in-memory store.

use atm_core::TransactionKind;
use atm_persistence::{AccountRepo, Database, PersistenceError, StoreConfig, TransactionRepo};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_insert_and_lookup_account() {
    let db = Database::in_memory().await.unwrap();

    let row = AccountRepo::insert(db.pool(), "alice", "1234", Utc::now())
        .await
        .unwrap();
    assert!(row.id > 0);

    let by_id = AccountRepo::get_by_id(db.pool(), row.id).await.unwrap();
    assert_eq!(by_id.name, "alice");
    assert_eq!(by_id.balance().unwrap(), dec!(0));

    let by_name = AccountRepo::find_by_name(db.pool(), "alice").await.unwrap();
    assert_eq!(by_name.map(|r| r.id), Some(row.id));

    assert!(AccountRepo::exists(db.pool(), row.id).await.unwrap());
    assert!(!AccountRepo::exists(db.pool(), row.id + 1).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_name_is_already_exists() {
    let db = Database::in_memory().await.unwrap();
    AccountRepo::insert(db.pool(), "alice", "1234", Utc::now())
        .await
        .unwrap();

    let err = AccountRepo::insert(db.pool(), "alice", "9999", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, PersistenceError::AlreadyExists { .. }));
    assert_eq!(AccountRepo::count(db.pool()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_credentials_and_pin_update() {
    let db = Database::in_memory().await.unwrap();
    let row = AccountRepo::insert(db.pool(), "budi", "1111", Utc::now())
        .await
        .unwrap();

    assert!(AccountRepo::find_by_credentials(db.pool(), "budi", "1111")
        .await
        .unwrap()
        .is_some());
    assert!(AccountRepo::find_by_credentials(db.pool(), "budi", "2222")
        .await
        .unwrap()
        .is_none());

    AccountRepo::update_pin(db.pool(), row.id, "2222").await.unwrap();
    assert!(AccountRepo::find_by_credentials(db.pool(), "budi", "2222")
        .await
        .unwrap()
        .is_some());

    let err = AccountRepo::update_pin(db.pool(), 999, "0000")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_lock_for_update_returns_current_row() {
    let db = Database::in_memory().await.unwrap();
    let row = AccountRepo::insert(db.pool(), "citra", "1234", Utc::now())
        .await
        .unwrap();

    let mut tx = db.begin().await.unwrap();
    let locked = AccountRepo::lock_for_update(&mut *tx, row.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(locked.name, "citra");
    assert!(AccountRepo::lock_for_update(&mut *tx, row.id + 100)
        .await
        .unwrap()
        .is_none());
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_rolled_back_unit_leaves_no_trace() {
    let db = Database::in_memory().await.unwrap();
    let row = AccountRepo::insert(db.pool(), "dewi", "1234", Utc::now())
        .await
        .unwrap();

    {
        let mut tx = db.begin().await.unwrap();
        AccountRepo::set_balance(&mut *tx, row.id, dec!(500)).await.unwrap();
        TransactionRepo::insert(
            &mut *tx,
            row.id,
            TransactionKind::Deposit,
            dec!(500),
            None,
            Utc::now(),
        )
        .await
        .unwrap();
        tx.rollback().await.unwrap();
    }

    assert_eq!(AccountRepo::get_balance(db.pool(), row.id).await.unwrap(), dec!(0));
    assert_eq!(
        TransactionRepo::count_by_account(db.pool(), row.id).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_history_order_filter_and_signed_sum() {
    let db = Database::in_memory().await.unwrap();
    let a = AccountRepo::insert(db.pool(), "eka", "1", Utc::now()).await.unwrap();
    let b = AccountRepo::insert(db.pool(), "fajar", "2", Utc::now()).await.unwrap();
    let t0 = Utc::now();

    TransactionRepo::insert(db.pool(), a.id, TransactionKind::Deposit, dec!(100), None, t0)
        .await
        .unwrap();
    TransactionRepo::insert(
        db.pool(),
        a.id,
        TransactionKind::Withdraw,
        dec!(30),
        None,
        t0 + Duration::seconds(1),
    )
    .await
    .unwrap();
    TransactionRepo::insert(
        db.pool(),
        a.id,
        TransactionKind::TransferOut,
        dec!(20),
        Some(b.id),
        t0 + Duration::seconds(2),
    )
    .await
    .unwrap();

    let all = TransactionRepo::get_by_account(db.pool(), a.id, None)
        .await
        .unwrap();
    let kinds: Vec<&str> = all.iter().map(|r| r.tx_type.as_str()).collect();
    assert_eq!(kinds, vec!["transfer_out", "withdraw", "deposit"]);
    assert_eq!(all[0].target_id, Some(b.id));

    let deposits =
        TransactionRepo::get_by_account(db.pool(), a.id, Some(TransactionKind::Deposit))
            .await
            .unwrap();
    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0].amount, "100");

    assert_eq!(
        TransactionRepo::signed_sum(db.pool(), a.id).await.unwrap(),
        dec!(50)
    );
    assert_eq!(TransactionRepo::count(db.pool()).await.unwrap(), 3);
}

#[tokio::test]
async fn test_connect_rejects_zero_connections() {
    let config = StoreConfig::in_memory().with_max_connections(0);
    let err = Database::connect(&config).await.unwrap_err();
    assert!(matches!(err, PersistenceError::Configuration(_)));
}

#[tokio::test]
async fn test_file_store_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::for_path(dir.path().join("atm.db"));

    let db = Database::connect(&config).await.unwrap();
    AccountRepo::insert(db.pool(), "gita", "1234", Utc::now())
        .await
        .unwrap();
    db.close().await;

    let db = Database::connect(&config).await.unwrap();
    assert!(AccountRepo::find_by_name(db.pool(), "gita")
        .await
        .unwrap()
        .is_some());
}
