//! Account commands - register, login, balance, profile, PIN change

use anyhow::{Context, Result};
use atm_business::{AccountRegistry, ServiceContext, SessionService};

use super::{format_amount, open_session};
use crate::Credentials;

/// Open a new account
pub async fn register(ctx: &ServiceContext, name: &str, pin: &str) -> Result<()> {
    let account = AccountRegistry::new(ctx)
        .register(name, pin)
        .await
        .context("Failed to create account")?;

    println!("✅ Account created:");
    println!("   Account ID: {}", account.id);
    println!("   Name:       {}", account.name);
    Ok(())
}

/// Verify credentials
pub async fn login(ctx: &ServiceContext, credentials: &Credentials) -> Result<()> {
    let sessions = SessionService::new(ctx);
    let session = open_session(ctx, credentials).await.context("Login failed")?;

    println!("✅ Welcome, {}.", session.account_name());
    sessions.logout(session);
    Ok(())
}

/// Show the current balance
pub async fn balance(ctx: &ServiceContext, credentials: &Credentials) -> Result<()> {
    let sessions = SessionService::new(ctx);
    let session = open_session(ctx, credentials).await.context("Login failed")?;
    let account_id = sessions.require(&session)?;

    let balance = AccountRegistry::new(ctx)
        .get_balance(account_id)
        .await
        .context("Failed to check balance")?;

    println!("💰 Balance: {}", format_amount(balance));
    sessions.logout(session);
    Ok(())
}

/// Show account details
pub async fn profile(ctx: &ServiceContext, credentials: &Credentials) -> Result<()> {
    let sessions = SessionService::new(ctx);
    let session = open_session(ctx, credentials).await.context("Login failed")?;
    let account = AccountRegistry::new(ctx)
        .find(sessions.require(&session)?)
        .await?;

    println!("👤 Account Profile");
    println!("   Account ID: {}", account.id);
    println!("   Name:       {}", account.name);
    println!("   Balance:    {}", format_amount(account.balance));
    println!("   Opened:     {}", account.created_at.format("%Y-%m-%d %H:%M:%S"));
    sessions.logout(session);
    Ok(())
}

/// Change the PIN after re-checking the current one
pub async fn change_pin(ctx: &ServiceContext, credentials: &Credentials, new_pin: &str) -> Result<()> {
    let sessions = SessionService::new(ctx);
    let session = open_session(ctx, credentials).await.context("Login failed")?;

    sessions
        .change_pin(&session, &credentials.pin, new_pin)
        .await
        .context("Failed to change PIN")?;

    println!("✅ PIN changed.");
    sessions.logout(session);
    Ok(())
}
