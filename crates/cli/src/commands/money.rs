//! Money commands - deposit, withdraw, transfer, history, reconcile

use anyhow::{bail, Context, Result};
use atm_business::{AccountRegistry, HistoryEntry, LedgerService, ServiceContext, SessionService};
use atm_core::{AccountId, HistoryFilter, TransactionKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::{self, BufRead, Write};

use super::{format_amount, open_session};
use crate::Credentials;

/// Deposit funds
pub async fn deposit(ctx: &ServiceContext, credentials: &Credentials, amount: Decimal) -> Result<()> {
    let sessions = SessionService::new(ctx);
    let session = open_session(ctx, credentials).await.context("Login failed")?;

    let balance = LedgerService::new(ctx)
        .deposit(sessions.require(&session)?, amount)
        .await
        .context("Deposit failed")?;

    println!("✅ Deposited {}", format_amount(amount));
    println!("   Balance: {}", format_amount(balance));
    sessions.logout(session);
    Ok(())
}

/// Withdraw funds
pub async fn withdraw(ctx: &ServiceContext, credentials: &Credentials, amount: Decimal) -> Result<()> {
    let sessions = SessionService::new(ctx);
    let session = open_session(ctx, credentials).await.context("Login failed")?;

    let balance = LedgerService::new(ctx)
        .withdraw(sessions.require(&session)?, amount)
        .await
        .context("Withdrawal failed")?;

    println!("✅ Withdrew {}", format_amount(amount));
    println!("   Balance: {}", format_amount(balance));
    sessions.logout(session);
    Ok(())
}

/// Transfer to another account, confirming the recipient first
pub async fn transfer(
    ctx: &ServiceContext,
    credentials: &Credentials,
    target_id: i64,
    amount: Decimal,
    yes: bool,
) -> Result<()> {
    let sessions = SessionService::new(ctx);
    let session = open_session(ctx, credentials).await.context("Login failed")?;
    let source_id = sessions.require(&session)?;
    let target_id = AccountId(target_id);

    let target_name = AccountRegistry::new(ctx)
        .account_name(target_id)
        .await?
        .with_context(|| format!("Target account {} not found", target_id))?;
    println!("🎯 Recipient: {} (ID: {})", target_name, target_id);

    if !yes && !confirm(&format!("Send {} to {}?", format_amount(amount), target_name))? {
        println!("Transfer cancelled.");
        sessions.logout(session);
        return Ok(());
    }

    let balance = LedgerService::new(ctx)
        .transfer(source_id, target_id, amount)
        .await
        .context("Transfer failed")?;

    println!("✅ Transferred {} to {}", format_amount(amount), target_name);
    println!("   Balance: {}", format_amount(balance));
    sessions.logout(session);
    Ok(())
}

/// History row as printed with `--json`
#[derive(Debug, Serialize)]
struct HistoryView {
    id: i64,
    #[serde(rename = "type")]
    kind: TransactionKind,
    amount: Decimal,
    counterparty_id: Option<AccountId>,
    counterparty_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<&HistoryEntry> for HistoryView {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.transaction.id,
            kind: entry.transaction.kind,
            amount: entry.transaction.amount,
            counterparty_id: entry.transaction.counterparty,
            counterparty_name: entry.counterparty_name.clone(),
            created_at: entry.transaction.created_at,
        }
    }
}

/// Show transaction history
pub async fn history(
    ctx: &ServiceContext,
    credentials: &Credentials,
    filter: HistoryFilter,
    json: bool,
) -> Result<()> {
    let sessions = SessionService::new(ctx);
    let session = open_session(ctx, credentials).await.context("Login failed")?;

    let entries = LedgerService::new(ctx)
        .history(sessions.require(&session)?, filter)
        .await?;

    if json {
        let views: Vec<HistoryView> = entries.iter().map(HistoryView::from).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        println!("📜 Transaction History ({})", filter);
        println!("{}", "-".repeat(50));
        for entry in &entries {
            print_entry(entry);
        }
    }

    sessions.logout(session);
    Ok(())
}

fn print_entry(entry: &HistoryEntry) {
    let tx = &entry.transaction;
    println!("   Type:   {}", tx.kind);
    println!("   Amount: {}", format_amount(tx.amount));
    println!("   Date:   {}", tx.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(counterparty) = tx.counterparty {
        match &entry.counterparty_name {
            Some(name) => println!("   With:   {} (ID: {})", name, counterparty),
            None => println!("   With:   ID {}", counterparty),
        }
    }
    println!("{}", "-".repeat(50));
}

/// Compare cached balance with the ledger
pub async fn reconcile(ctx: &ServiceContext, credentials: &Credentials) -> Result<()> {
    let sessions = SessionService::new(ctx);
    let session = open_session(ctx, credentials).await.context("Login failed")?;

    let report = LedgerService::new(ctx)
        .reconcile(sessions.require(&session)?)
        .await?;
    sessions.logout(session);

    println!("🔎 Reconciliation for account {}", report.account_id);
    println!("   Balance: {}", format_amount(report.cached));
    println!("   Ledger:  {}", format_amount(report.ledger));
    if !report.is_consistent() {
        bail!("balance differs from ledger by {}", report.drift());
    }
    println!("✅ Consistent");
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y"))
}
