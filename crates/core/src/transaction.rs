//! # Transaction Module
//!
//! Append-only ledger entries. The amount is always positive; its sign
//! comes from the kind.

use crate::account::AccountId;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Cash in
    Deposit,
    /// Cash out
    Withdraw,
    /// Credit side of a transfer
    TransferIn,
    /// Debit side of a transfer
    TransferOut,
}

impl TransactionKind {
    /// Code stored in the `transactions.type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::TransferIn => "transfer_in",
            TransactionKind::TransferOut => "transfer_out",
        }
    }

    /// True for kinds that increase the balance.
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::TransferIn)
    }

    /// True for the two legs of a transfer, which carry a counterparty.
    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            TransactionKind::TransferIn | TransactionKind::TransferOut
        )
    }

    /// Applies the kind's sign to a positive amount.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        if self.is_credit() {
            amount
        } else {
            -amount
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdraw" => Ok(TransactionKind::Withdraw),
            "transfer_in" => Ok(TransactionKind::TransferIn),
            "transfer_out" => Ok(TransactionKind::TransferOut),
            other => Err(CoreError::UnknownTransactionKind(other.to_string())),
        }
    }
}

/// One row of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub amount: Decimal,
    /// Counterparty for transfer legs, `None` otherwise.
    pub counterparty: Option<AccountId>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Effect of this entry on the owning account's balance.
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

/// Selects which ledger entries a history query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Only(TransactionKind),
}

impl HistoryFilter {
    /// The kind to filter on, or `None` for every entry.
    pub fn kind(&self) -> Option<TransactionKind> {
        match self {
            HistoryFilter::All => None,
            HistoryFilter::Only(k) => Some(*k),
        }
    }
}

impl fmt::Display for HistoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryFilter::All => write!(f, "all"),
            HistoryFilter::Only(kind) => write!(f, "{}", kind),
        }
    }
}

impl FromStr for HistoryFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(HistoryFilter::All);
        }
        s.parse::<TransactionKind>()
            .map(HistoryFilter::Only)
            .map_err(|_| CoreError::UnknownHistoryFilter(s.to_string()))
    }
}

impl From<TransactionKind> for HistoryFilter {
    fn from(kind: TransactionKind) -> Self {
        HistoryFilter::Only(kind)
    }
}
