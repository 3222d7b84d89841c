//! # Session Module
//!
//! An explicit login session, passed to every operation that acts on
//! behalf of a user. Lifecycle: login → active → logout (consumes the
//! value) or expire (TTL elapsed).

use crate::account::{Account, AccountId};
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    account_id: AccountId,
    account_name: String,
    started_at: DateTime<Utc>,
    ttl: Option<Duration>,
}

impl Session {
    /// Opens a session for an authenticated account.
    pub fn start(account: &Account, started_at: DateTime<Utc>, ttl: Option<Duration>) -> Self {
        Self {
            account_id: account.id,
            account_name: account.name.clone(),
            started_at,
            ttl,
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.ttl.map(|ttl| self.started_at + ttl)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|deadline| now >= deadline)
    }

    /// Returns the account id if the session is still usable at `now`.
    pub fn ensure_active(&self, now: DateTime<Utc>) -> CoreResult<AccountId> {
        if self.is_expired(now) {
            return Err(CoreError::SessionExpired(self.account_id.to_string()));
        }
        Ok(self.account_id)
    }
}
