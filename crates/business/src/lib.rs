//! # ATM Business
//!
//! Account Registry and Money Movement Engine on top of the ledger store.
//!
//! ```rust,ignore
//! use atm_business::{AccountRegistry, LedgerService, ServiceContext};
//!
//! let ctx = ServiceContext::new(db);
//! let alice = AccountRegistry::new(&ctx).register("alice", "1234").await?;
//! let balance = LedgerService::new(&ctx).deposit(alice.id, dec!(50000)).await?;
//! ```

pub mod error;
pub mod ledger;
pub mod registry;
pub mod services;
pub mod session;

pub use error::{BusinessError, BusinessResult, ErrorKind};
pub use ledger::LedgerService;
pub use registry::AccountRegistry;
pub use services::{HistoryEntry, Reconciliation, ServiceContext};
pub use session::SessionService;
