//! # ATM Persistence
//!
//! Ledger store for the ATM: SQLite via sqlx, two tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  Database                    │
//! │  ┌──────────────┐       ┌─────────────────┐  │
//! │  │   accounts   │◄──────│  transactions   │  │
//! │  │  (balances)  │       │  (append-only)  │  │
//! │  └──────────────┘       └─────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atm_persistence::{AccountRepo, Database, StoreConfig};
//!
//! let db = Database::connect(&StoreConfig::default()).await?;
//! let balance = AccountRepo::get_balance(db.pool(), 1).await?;
//!
//! let mut tx = db.begin().await?;
//! let row = AccountRepo::lock_for_update(&mut *tx, 1).await?;
//! tx.commit().await?;
//! ```

pub mod config;
pub mod error;
pub mod sqlite;

pub use config::StoreConfig;
pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::schema::{AccountRow, TransactionRow};
pub use sqlite::{AccountRepo, TransactionRepo};

use sqlx::{Sqlite, SqlitePool};
use tracing::info;

/// Database facade - owns the connection pool
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the store and brings the schema up to date.
    pub async fn connect(config: &StoreConfig) -> PersistenceResult<Self> {
        let pool = sqlite::connect(config).await?;
        sqlite::run_migrations(&pool).await?;
        info!(
            url = %config.database_url,
            max_connections = config.max_connections,
            "ledger store ready"
        );
        Ok(Self { pool })
    }

    /// Fresh private in-memory store, schema applied.
    pub async fn in_memory() -> PersistenceResult<Self> {
        Self::connect(&StoreConfig::in_memory()).await
    }

    /// Get SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Starts an atomic unit. Dropping it without `commit` rolls back.
    pub async fn begin(&self) -> PersistenceResult<sqlx::Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
