//! Money Movement Engine - deposit, withdraw, transfer, history
//!
//! Each mutation is one store transaction: lock the account row(s), check
//! against the locked state, write the new balance(s) and the ledger
//! row(s), commit. Any early return drops the `sqlx::Transaction`, which
//! rolls the unit back, so a balance never changes without its ledger row.

use crate::error::{BusinessError, BusinessResult};
use crate::services::{HistoryEntry, Reconciliation, ServiceContext};
use atm_core::{Account, AccountId, HistoryFilter, Transaction, TransactionKind};
use atm_persistence::{AccountRepo, AccountRow, PersistenceError, TransactionRepo};
use rust_decimal::Decimal;
use sqlx::{Sqlite, SqliteConnection};
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub struct LedgerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LedgerService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Adds `amount` to the account. Returns the new balance.
    pub async fn deposit(&self, account_id: AccountId, amount: Decimal) -> BusinessResult<Decimal> {
        validate_amount(amount, "Deposit")?;

        let mut tx = self.ctx.db().begin().await?;
        let account = lock(&mut tx, account_id)
            .await?
            .ok_or(BusinessError::AccountNotFound(account_id))?;

        let new_balance = credit(account.balance()?, amount, account_id)?;
        let now = self.ctx.now();
        AccountRepo::set_balance(&mut *tx, account.id, new_balance).await?;
        TransactionRepo::insert(&mut *tx, account.id, TransactionKind::Deposit, amount, None, now)
            .await?;
        commit(tx).await?;

        info!(account_id = %account_id, %amount, balance = %new_balance, "deposit committed");
        Ok(new_balance)
    }

    /// Removes `amount` from the account if the balance covers it.
    /// Returns the new balance.
    pub async fn withdraw(&self, account_id: AccountId, amount: Decimal) -> BusinessResult<Decimal> {
        validate_amount(amount, "Withdrawal")?;

        let mut tx = self.ctx.db().begin().await?;
        let account = lock(&mut tx, account_id)
            .await?
            .map(Account::try_from)
            .transpose()?
            .ok_or(BusinessError::AccountNotFound(account_id))?;

        if !account.can_cover(amount) {
            let available = account.balance;
            warn!(account_id = %account_id, %amount, %available, "withdrawal rejected");
            return Err(BusinessError::insufficient_funds(amount, available));
        }

        let new_balance = account.balance - amount;
        let now = self.ctx.now();
        AccountRepo::set_balance(&mut *tx, account_id.get(), new_balance).await?;
        TransactionRepo::insert(
            &mut *tx,
            account_id.get(),
            TransactionKind::Withdraw,
            amount,
            None,
            now,
        )
        .await?;
        commit(tx).await?;

        info!(account_id = %account_id, %amount, balance = %new_balance, "withdrawal committed");
        Ok(new_balance)
    }

    /// Moves `amount` from `source_id` to `target_id`: two balance writes
    /// and two ledger rows in one unit. Returns the new source balance.
    pub async fn transfer(
        &self,
        source_id: AccountId,
        target_id: AccountId,
        amount: Decimal,
    ) -> BusinessResult<Decimal> {
        validate_amount(amount, "Transfer")?;
        if source_id == target_id {
            return Err(BusinessError::SelfTransfer(source_id));
        }

        let mut tx = self.ctx.db().begin().await?;

        // Ascending id order, so two opposite transfers never wait on each other.
        let (low, high) = if source_id < target_id {
            (source_id, target_id)
        } else {
            (target_id, source_id)
        };
        let low_row = lock(&mut tx, low).await?;
        let high_row = lock(&mut tx, high).await?;
        let (source, target) = if source_id < target_id {
            (low_row, high_row)
        } else {
            (high_row, low_row)
        };
        let source = source
            .map(Account::try_from)
            .transpose()?
            .ok_or(BusinessError::SourceNotFound(source_id))?;
        let target = target
            .map(Account::try_from)
            .transpose()?
            .ok_or(BusinessError::TargetNotFound(target_id))?;

        if !source.can_cover(amount) {
            let available = source.balance;
            warn!(
                source_id = %source_id,
                target_id = %target_id,
                %amount,
                %available,
                "transfer rejected"
            );
            return Err(BusinessError::insufficient_funds(amount, available));
        }

        let new_source_balance = source.balance - amount;
        let new_target_balance = credit(target.balance, amount, target_id)?;
        let now = self.ctx.now();

        AccountRepo::set_balance(&mut *tx, source.id.get(), new_source_balance).await?;
        AccountRepo::set_balance(&mut *tx, target.id.get(), new_target_balance).await?;
        TransactionRepo::insert(
            &mut *tx,
            source.id.get(),
            TransactionKind::TransferOut,
            amount,
            Some(target.id.get()),
            now,
        )
        .await?;
        TransactionRepo::insert(
            &mut *tx,
            target.id.get(),
            TransactionKind::TransferIn,
            amount,
            Some(source.id.get()),
            now,
        )
        .await?;
        commit(tx).await?;

        info!(
            source_id = %source_id,
            target_id = %target_id,
            %amount,
            balance = %new_source_balance,
            "transfer committed"
        );
        Ok(new_source_balance)
    }

    /// Ledger entries of an account matching `filter`, most recent first.
    ///
    /// An empty result is reported as `NoHistory`. Transfer legs carry the
    /// counterparty's name when it can be looked up; a failed lookup only
    /// drops the name.
    pub async fn history(
        &self,
        account_id: AccountId,
        filter: HistoryFilter,
    ) -> BusinessResult<Vec<HistoryEntry>> {
        // Existence check, query and name lookups share one snapshot.
        let mut tx = self.ctx.db().begin().await?;
        if !AccountRepo::exists(&mut *tx, account_id.get()).await? {
            return Err(BusinessError::AccountNotFound(account_id));
        }

        let rows =
            TransactionRepo::get_by_account(&mut *tx, account_id.get(), filter.kind()).await?;
        if rows.is_empty() {
            return Err(BusinessError::NoHistory { account_id, filter });
        }
        debug!(account_id = %account_id, %filter, count = rows.len(), "history loaded");

        let mut names: HashMap<AccountId, Option<String>> = HashMap::new();
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let transaction = Transaction::try_from(row)?;
            let counterparty_name = match transaction.counterparty {
                Some(counterparty) if transaction.kind.is_transfer() => {
                    if !names.contains_key(&counterparty) {
                        let name = counterparty_name(&mut tx, counterparty).await;
                        names.insert(counterparty, name);
                    }
                    names.get(&counterparty).cloned().flatten()
                }
                _ => None,
            };
            entries.push(HistoryEntry {
                transaction,
                counterparty_name,
            });
        }
        commit(tx).await?;
        Ok(entries)
    }

    /// Compares the cached balance with the signed sum of the ledger.
    pub async fn reconcile(&self, account_id: AccountId) -> BusinessResult<Reconciliation> {
        // Both reads in one unit so they see the same snapshot.
        let mut tx = self.ctx.db().begin().await?;
        let cached = AccountRepo::get_balance(&mut *tx, account_id.get())
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    BusinessError::AccountNotFound(account_id)
                } else {
                    BusinessError::Persistence(e)
                }
            })?;
        let ledger = TransactionRepo::signed_sum(&mut *tx, account_id.get()).await?;
        commit(tx).await?;

        let reconciliation = Reconciliation {
            account_id,
            cached,
            ledger,
        };
        if !reconciliation.is_consistent() {
            warn!(account_id = %account_id, %cached, %ledger, "balance drifted from ledger");
        }
        Ok(reconciliation)
    }
}

async fn counterparty_name(conn: &mut SqliteConnection, account_id: AccountId) -> Option<String> {
    match AccountRepo::get_name(conn, account_id.get()).await {
        Ok(Some(name)) => Some(name),
        Ok(None) => {
            warn!(account_id = %account_id, "counterparty no longer exists");
            None
        }
        Err(e) => {
            warn!(account_id = %account_id, error = %e, "counterparty lookup failed");
            None
        }
    }
}

/// Adds a credit to a balance, refusing amounts the balance cannot hold.
fn credit(balance: Decimal, amount: Decimal, account_id: AccountId) -> BusinessResult<Decimal> {
    balance.checked_add(amount).ok_or_else(|| {
        BusinessError::InvalidAmount(format!(
            "crediting {} would overflow the balance of account {}",
            amount, account_id
        ))
    })
}

fn validate_amount(amount: Decimal, operation: &str) -> BusinessResult<()> {
    if amount <= Decimal::ZERO {
        return Err(BusinessError::InvalidAmount(format!(
            "{} amount must be positive: {}",
            operation, amount
        )));
    }
    Ok(())
}

async fn lock(
    conn: &mut SqliteConnection,
    account_id: AccountId,
) -> BusinessResult<Option<AccountRow>> {
    Ok(AccountRepo::lock_for_update(conn, account_id.get()).await?)
}

async fn commit(tx: sqlx::Transaction<'_, Sqlite>) -> BusinessResult<()> {
    tx.commit().await.map_err(PersistenceError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(dec!(0.01), "Deposit").is_ok());

        let err = validate_amount(dec!(0), "Deposit").unwrap_err();
        assert!(err.to_string().contains("Deposit amount must be positive"));

        assert!(matches!(
            validate_amount(dec!(-5), "Withdrawal"),
            Err(BusinessError::InvalidAmount(_))
        ));
    }
}
