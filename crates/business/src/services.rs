//! Shared service context and result types.

use atm_core::{AccountId, Transaction};
use atm_persistence::Database;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

/// Context for business operations - contains database access
#[derive(Debug, Clone)]
pub struct ServiceContext {
    db: Database,
    session_ttl: Option<Duration>,
}

impl ServiceContext {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            session_ttl: None,
        }
    }

    /// Sessions opened through this context expire after `ttl`.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = Some(ttl);
        self
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Get database pool
    pub fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }

    pub fn session_ttl(&self) -> Option<Duration> {
        self.session_ttl
    }

    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A ledger entry as shown to the account owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub transaction: Transaction,
    /// Counterparty display name for transfer legs; `None` if the lookup
    /// failed or the entry is not a transfer.
    pub counterparty_name: Option<String>,
}

/// Cached balance versus the sum of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub account_id: AccountId,
    pub cached: Decimal,
    pub ledger: Decimal,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.cached == self.ledger
    }

    pub fn drift(&self) -> Decimal {
        self.cached - self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reconciliation() {
        let ok = Reconciliation {
            account_id: AccountId(1),
            cached: dec!(120000),
            ledger: dec!(120000.00),
        };
        assert!(ok.is_consistent());

        let drifted = Reconciliation {
            account_id: AccountId(1),
            cached: dec!(100),
            ledger: dec!(70),
        };
        assert!(!drifted.is_consistent());
        assert_eq!(drifted.drift(), dec!(30));
    }
}
