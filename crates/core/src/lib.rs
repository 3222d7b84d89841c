//! # ATM Core
//!
//! Core domain types for the ATM ledger. No I/O lives here; the store
//! adapter and the money movement engine build on these types.
//!
//! ```text
//! Account ──< Transaction (deposit | withdraw | transfer_in | transfer_out)
//!    │
//!    └── Session (login → active → logout / expire)
//! ```

pub mod account;
pub mod error;
pub mod session;
pub mod transaction;

pub use account::{Account, AccountId};
pub use error::{CoreError, CoreResult};
pub use session::Session;
pub use transaction::{HistoryFilter, Transaction, TransactionKind};
