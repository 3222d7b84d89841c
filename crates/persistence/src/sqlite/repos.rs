//! Repository implementations for SQLite
//!
//! Every query takes a `SqliteExecutor`, so the same call works against the
//! pool or inside an open `sqlx::Transaction` (`&mut *tx`).

use crate::config::StoreConfig;
use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;
use atm_core::TransactionKind;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{SqliteExecutor, SqlitePool};
use std::str::FromStr;

const ACCOUNT_COLUMNS: &str = "id, name, pin, balance, created_at";

// ============================================================================
// Account Repository
// ============================================================================

/// Repository for the accounts table
pub struct AccountRepo;

impl AccountRepo {
    /// Inserts a new account with a zero balance.
    ///
    /// The UNIQUE constraint on `name` is the uniqueness check, so two
    /// concurrent registrations of the same name cannot both succeed.
    pub async fn insert<'e>(
        executor: impl SqliteExecutor<'e>,
        name: &str,
        pin: &str,
        created_at: DateTime<Utc>,
    ) -> PersistenceResult<AccountRow> {
        let result = sqlx::query(
            "INSERT INTO accounts (name, pin, balance, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(pin)
        .bind(Decimal::ZERO.to_string())
        .bind(created_at)
        .execute(executor)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PersistenceError::already_exists("Account", name)
            }
            other => PersistenceError::Database(other),
        })?;

        Ok(AccountRow {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            pin: pin.to_string(),
            balance: Decimal::ZERO.to_string(),
            created_at,
        })
    }

    /// Get account by ID
    pub async fn get_by_id<'e>(
        executor: impl SqliteExecutor<'e>,
        id: i64,
    ) -> PersistenceResult<AccountRow> {
        Self::find_by_id(executor, id)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Account", &id.to_string()))
    }

    pub async fn find_by_id<'e>(
        executor: impl SqliteExecutor<'e>,
        id: i64,
    ) -> PersistenceResult<Option<AccountRow>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn find_by_name<'e>(
        executor: impl SqliteExecutor<'e>,
        name: &str,
    ) -> PersistenceResult<Option<AccountRow>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE name = ?"
        ))
        .bind(name)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    /// Account matching both name and PIN exactly.
    pub async fn find_by_credentials<'e>(
        executor: impl SqliteExecutor<'e>,
        name: &str,
        pin: &str,
    ) -> PersistenceResult<Option<AccountRow>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE name = ? AND pin = ?"
        ))
        .bind(name)
        .bind(pin)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn exists<'e>(executor: impl SqliteExecutor<'e>, id: i64) -> PersistenceResult<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(row.0 > 0)
    }

    pub async fn get_balance<'e>(
        executor: impl SqliteExecutor<'e>,
        id: i64,
    ) -> PersistenceResult<Decimal> {
        let row: Option<(String,)> = sqlx::query_as("SELECT balance FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        match row {
            Some((balance,)) => parse_decimal(&balance),
            None => Err(PersistenceError::not_found("Account", &id.to_string())),
        }
    }

    pub async fn get_name<'e>(
        executor: impl SqliteExecutor<'e>,
        id: i64,
    ) -> PersistenceResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT name FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row.map(|(name,)| name))
    }

    /// Update PIN
    pub async fn update_pin<'e>(
        executor: impl SqliteExecutor<'e>,
        id: i64,
        pin: &str,
    ) -> PersistenceResult<()> {
        let result = sqlx::query("UPDATE accounts SET pin = ? WHERE id = ?")
            .bind(pin)
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Account", &id.to_string()));
        }
        Ok(())
    }

    /// Takes the write lock on an account row and returns its current state.
    ///
    /// Must be the first statement of a unit: SQLite then acquires the
    /// database write lock before any read, waiting on the busy timeout if
    /// another unit holds it. Returns `None` when the account does not exist.
    pub async fn lock_for_update<'e>(
        executor: impl SqliteExecutor<'e>,
        id: i64,
    ) -> PersistenceResult<Option<AccountRow>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "UPDATE accounts SET balance = balance WHERE id = ? RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    /// Overwrites the cached balance. Only the ledger service calls this,
    /// inside the same unit as the matching ledger insert.
    pub async fn set_balance<'e>(
        executor: impl SqliteExecutor<'e>,
        id: i64,
        balance: Decimal,
    ) -> PersistenceResult<()> {
        let result = sqlx::query("UPDATE accounts SET balance = ? WHERE id = ?")
            .bind(balance.to_string())
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Account", &id.to_string()));
        }
        Ok(())
    }

    pub async fn count<'e>(executor: impl SqliteExecutor<'e>) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Transaction Repository
// ============================================================================

/// Repository for the append-only transactions table
pub struct TransactionRepo;

impl TransactionRepo {
    /// Appends a ledger entry and returns its id.
    pub async fn insert<'e>(
        executor: impl SqliteExecutor<'e>,
        account_id: i64,
        kind: TransactionKind,
        amount: Decimal,
        target_id: Option<i64>,
        created_at: DateTime<Utc>,
    ) -> PersistenceResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (account_id, type, amount, target_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(account_id)
        .bind(kind.as_str())
        .bind(amount.to_string())
        .bind(target_id)
        .bind(created_at)
        .execute(executor)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Ledger entries of an account, most recent first.
    pub async fn get_by_account<'e>(
        executor: impl SqliteExecutor<'e>,
        account_id: i64,
        kind: Option<TransactionKind>,
    ) -> PersistenceResult<Vec<TransactionRow>> {
        let rows = match kind {
            None => {
                sqlx::query_as::<_, TransactionRow>(
                    r#"
                    SELECT id, account_id, type, amount, target_id, created_at
                    FROM transactions
                    WHERE account_id = ?
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(account_id)
                .fetch_all(executor)
                .await?
            }
            Some(kind) => {
                sqlx::query_as::<_, TransactionRow>(
                    r#"
                    SELECT id, account_id, type, amount, target_id, created_at
                    FROM transactions
                    WHERE account_id = ? AND type = ?
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(account_id)
                .bind(kind.as_str())
                .fetch_all(executor)
                .await?
            }
        };
        Ok(rows)
    }

    /// Sum of signed entry amounts for an account.
    ///
    /// Summed in Rust: SQLite would coerce the TEXT amounts to floating point.
    pub async fn signed_sum<'e>(
        executor: impl SqliteExecutor<'e>,
        account_id: i64,
    ) -> PersistenceResult<Decimal> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT type, amount FROM transactions WHERE account_id = ?")
                .bind(account_id)
                .fetch_all(executor)
                .await?;

        rows.iter().try_fold(Decimal::ZERO, |total, (tx_type, amount)| {
            Ok(total + parse_kind(tx_type)?.signed(parse_decimal(amount)?))
        })
    }

    pub async fn count_by_account<'e>(
        executor: impl SqliteExecutor<'e>,
        account_id: i64,
    ) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE account_id = ?")
            .bind(account_id)
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    pub async fn count<'e>(executor: impl SqliteExecutor<'e>) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Database initialization
// ============================================================================

/// Opens a connection pool for the given settings.
pub async fn connect(config: &StoreConfig) -> PersistenceResult<SqlitePool> {
    let mut options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(config.create_if_missing)
        .busy_timeout(config.busy_timeout)
        .foreign_keys(true);
    if config.wal {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    if config.max_connections == 0 {
        return Err(PersistenceError::Configuration(
            "max_connections must be at least 1".to_string(),
        ));
    }

    let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
    if config.is_in_memory() {
        // Closing the only connection would drop the database.
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options.connect_with(options).await?;
    Ok(pool)
}

/// Run migrations
pub async fn run_migrations(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}
