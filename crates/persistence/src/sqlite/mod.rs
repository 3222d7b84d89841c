//! SQLite persistence module
//!
//! Repository pattern for SQLite database access.

pub mod repos;
pub mod schema;

pub use repos::{connect, run_migrations, AccountRepo, TransactionRepo};
pub use schema::{AccountRow, TransactionRow};
