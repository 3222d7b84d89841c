//! Database schema definitions
//!
//! Row types for sqlx mapping from SQLite tables.
//! Schema is defined in migrations/20261019000000_init.sql

use crate::error::{PersistenceError, PersistenceResult};
use atm_core::{Account, AccountId, Transaction, TransactionKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Row type for the `accounts` table
///
/// Carries the PIN, so it never leaves the persistence and registry layers.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub name: String,
    pub pin: String,
    pub balance: String, // Decimal stored as TEXT
    pub created_at: DateTime<Utc>,
}

/// Row type for the `transactions` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: i64,
    pub account_id: i64,
    #[sqlx(rename = "type")]
    pub tx_type: String,
    pub amount: String, // Decimal stored as TEXT
    pub target_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Parses a decimal column value.
pub fn parse_decimal(value: &str) -> PersistenceResult<Decimal> {
    Decimal::from_str(value).map_err(|e| PersistenceError::InvalidDecimal(format!("{value}: {e}")))
}

/// Parses a `transactions.type` column value.
pub fn parse_kind(value: &str) -> PersistenceResult<TransactionKind> {
    TransactionKind::from_str(value).map_err(|_| PersistenceError::InvalidEnumValue {
        field: "type".to_string(),
        value: value.to_string(),
    })
}

impl AccountRow {
    pub fn balance(&self) -> PersistenceResult<Decimal> {
        parse_decimal(&self.balance)
    }

    /// Plain equality, the stored PIN is not hashed.
    pub fn pin_matches(&self, pin: &str) -> bool {
        self.pin == pin
    }
}

// === Conversion implementations ===

impl TryFrom<AccountRow> for Account {
    type Error = PersistenceError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AccountId(row.id),
            balance: parse_decimal(&row.balance)?,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = PersistenceError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            account_id: AccountId(row.account_id),
            kind: parse_kind(&row.tx_type)?,
            amount: parse_decimal(&row.amount)?,
            counterparty: row.target_id.map(AccountId),
            created_at: row.created_at,
        })
    }
}
