//! Account Registry - register, authenticate, balance and PIN management
//!
//! The registry never changes a balance; that is the ledger service's job.

use crate::error::{BusinessError, BusinessResult};
use crate::services::ServiceContext;
use atm_core::{Account, AccountId};
use atm_persistence::{AccountRepo, PersistenceError};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

pub struct AccountRegistry<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccountRegistry<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Creates an account with a zero balance.
    pub async fn register(&self, name: &str, pin: &str) -> BusinessResult<Account> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BusinessError::InvalidInput(
                "Account name must not be empty".to_string(),
            ));
        }
        validate_pin(pin)?;

        let row = AccountRepo::insert(self.ctx.pool(), name, pin, self.ctx.now())
            .await
            .map_err(|e| {
                if e.is_already_exists() {
                    BusinessError::NameTaken(name.to_string())
                } else {
                    BusinessError::Persistence(e)
                }
            })?;

        info!(account_id = row.id, account_name = name, "account registered");
        Ok(Account::try_from(row)?)
    }

    /// Account matching both name and PIN.
    pub async fn authenticate(&self, name: &str, pin: &str) -> BusinessResult<Account> {
        match AccountRepo::find_by_credentials(self.ctx.pool(), name.trim(), pin).await? {
            Some(row) => {
                debug!(account_id = row.id, "credentials accepted");
                Ok(Account::try_from(row)?)
            }
            None => {
                warn!(account_name = name, "authentication failed");
                Err(BusinessError::InvalidCredentials)
            }
        }
    }

    pub async fn find(&self, account_id: AccountId) -> BusinessResult<Account> {
        AccountRepo::find_by_id(self.ctx.pool(), account_id.get())
            .await?
            .ok_or(BusinessError::AccountNotFound(account_id))
            .and_then(|row| Ok(Account::try_from(row)?))
    }

    pub async fn get_balance(&self, account_id: AccountId) -> BusinessResult<Decimal> {
        AccountRepo::get_balance(self.ctx.pool(), account_id.get())
            .await
            .map_err(|e| not_found_as(e, account_id))
    }

    /// Replaces the PIN. The caller has already checked the old one.
    pub async fn change_pin(&self, account_id: AccountId, new_pin: &str) -> BusinessResult<()> {
        validate_pin(new_pin)?;
        AccountRepo::update_pin(self.ctx.pool(), account_id.get(), new_pin)
            .await
            .map_err(|e| not_found_as(e, account_id))?;
        info!(account_id = %account_id, "pin changed");
        Ok(())
    }

    pub async fn exists(&self, account_id: AccountId) -> BusinessResult<bool> {
        Ok(AccountRepo::exists(self.ctx.pool(), account_id.get()).await?)
    }

    /// Display name of an account, `None` if it does not exist.
    pub async fn account_name(&self, account_id: AccountId) -> BusinessResult<Option<String>> {
        Ok(AccountRepo::get_name(self.ctx.pool(), account_id.get()).await?)
    }

    /// Checks a PIN against the stored one for an existing account.
    pub(crate) async fn verify_pin(&self, account_id: AccountId, pin: &str) -> BusinessResult<()> {
        let row = AccountRepo::find_by_id(self.ctx.pool(), account_id.get())
            .await?
            .ok_or(BusinessError::AccountNotFound(account_id))?;
        if !row.pin_matches(pin) {
            warn!(account_id = %account_id, "pin verification failed");
            return Err(BusinessError::IncorrectPin);
        }
        Ok(())
    }
}

fn validate_pin(pin: &str) -> BusinessResult<()> {
    if pin.trim().is_empty() {
        return Err(BusinessError::InvalidInput("PIN must not be empty".to_string()));
    }
    Ok(())
}

fn not_found_as(err: PersistenceError, account_id: AccountId) -> BusinessError {
    if err.is_not_found() {
        BusinessError::AccountNotFound(account_id)
    } else {
        BusinessError::Persistence(err)
    }
}
