//! Several connections racing on the same accounts.

mod common;

use atm_business::{AccountRegistry, BusinessError, LedgerService};
use common::{file_context, funded_account};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdrawals_never_overdraw() {
    let (ctx, _dir) = file_context(4).await;
    let alice = funded_account(&ctx, "alice", dec!(100)).await;

    let mut handles = Vec::new();
    for _ in 0..2 {
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            LedgerService::new(&ctx).withdraw(alice.id, dec!(60)).await
        }));
    }

    let mut succeeded = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(balance) => {
                assert_eq!(balance, dec!(40));
                succeeded += 1;
            }
            Err(BusinessError::InsufficientFunds { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!((succeeded, rejected), (1, 1));

    let registry = AccountRegistry::new(&ctx);
    assert_eq!(registry.get_balance(alice.id).await.unwrap(), dec!(40));
    assert!(LedgerService::new(&ctx)
        .reconcile(alice.id)
        .await
        .unwrap()
        .is_consistent());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transfers_conserve_money() {
    let (ctx, _dir) = file_context(4).await;
    let alice = funded_account(&ctx, "alice", dec!(1000)).await;
    let budi = funded_account(&ctx, "budi", dec!(1000)).await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let ctx = ctx.clone();
        let (from, to) = if i % 2 == 0 {
            (alice.id, budi.id)
        } else {
            (budi.id, alice.id)
        };
        handles.push(tokio::spawn(async move {
            LedgerService::new(&ctx)
                .transfer(from, to, Decimal::from(10 + i))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let ledger = LedgerService::new(&ctx);
    let a = ledger.reconcile(alice.id).await.unwrap();
    let b = ledger.reconcile(budi.id).await.unwrap();
    assert!(a.is_consistent());
    assert!(b.is_consistent());
    assert_eq!(a.cached + b.cached, dec!(2000));
    assert!(a.cached >= Decimal::ZERO && b.cached >= Decimal::ZERO);
}
