//! Session handling - login, logout, PIN change for the logged-in user.

use crate::error::{BusinessError, BusinessResult};
use crate::registry::AccountRegistry;
use crate::services::ServiceContext;
use atm_core::{AccountId, Session};
use tracing::info;

pub struct SessionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SessionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Authenticates and opens a session with the context's TTL.
    pub async fn login(&self, name: &str, pin: &str) -> BusinessResult<Session> {
        let account = AccountRegistry::new(self.ctx).authenticate(name, pin).await?;
        let session = Session::start(&account, self.ctx.now(), self.ctx.session_ttl());
        info!(account_id = %account.id, "session started");
        Ok(session)
    }

    /// Account id of a session that has not expired.
    pub fn require(&self, session: &Session) -> BusinessResult<AccountId> {
        Ok(session.ensure_active(self.ctx.now())?)
    }

    /// Verifies `old_pin`, then stores `new_pin`.
    pub async fn change_pin(
        &self,
        session: &Session,
        old_pin: &str,
        new_pin: &str,
    ) -> BusinessResult<()> {
        let account_id = self.require(session)?;
        let registry = AccountRegistry::new(self.ctx);
        registry.verify_pin(account_id, old_pin).await?;
        if old_pin == new_pin {
            return Err(BusinessError::InvalidInput(
                "New PIN must differ from the current one".to_string(),
            ));
        }
        registry.change_pin(account_id, new_pin).await
    }

    /// Ends the session.
    pub fn logout(&self, session: Session) {
        let duration = self.ctx.now() - session.started_at();
        info!(
            account_id = %session.account_id(),
            duration_secs = duration.num_seconds(),
            "session ended"
        );
    }
}
