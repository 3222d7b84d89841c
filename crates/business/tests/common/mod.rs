#![allow(dead_code)]

use atm_business::{AccountRegistry, LedgerService, ServiceContext};
use atm_core::Account;
use atm_persistence::{Database, StoreConfig};
use rust_decimal::Decimal;
use tempfile::TempDir;

pub async fn memory_context() -> ServiceContext {
    ServiceContext::new(Database::in_memory().await.unwrap())
}

/// On-disk WAL store with a multi-connection pool. Keep the `TempDir`
/// alive for the duration of the test.
pub async fn file_context(max_connections: u32) -> (ServiceContext, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config =
        StoreConfig::for_path(dir.path().join("atm.db")).with_max_connections(max_connections);
    let db = Database::connect(&config).await.unwrap();
    (ServiceContext::new(db), dir)
}

pub async fn funded_account(ctx: &ServiceContext, name: &str, balance: Decimal) -> Account {
    let account = AccountRegistry::new(ctx).register(name, "1234").await.unwrap();
    if balance > Decimal::ZERO {
        LedgerService::new(ctx).deposit(account.id, balance).await.unwrap();
    }
    account
}
