//! Database bootstrap and status

use anyhow::{Context, Result};
use atm_business::ServiceContext;
use atm_persistence::{AccountRepo, Database, StoreConfig, TransactionRepo};
use std::time::Duration;

use crate::Cli;

/// Store settings from the global flags
pub fn store_config(cli: &Cli) -> StoreConfig {
    StoreConfig::for_path(&cli.db)
        .with_max_connections(cli.max_connections)
        .with_busy_timeout(Duration::from_millis(cli.busy_timeout_ms))
}

/// Create the database file and apply migrations
pub async fn init_database(cli: &Cli, force: bool) -> Result<()> {
    if force && cli.db.exists() {
        std::fs::remove_file(&cli.db).context("Failed to remove existing database")?;
        println!("🗑️  Removed existing database");
    }

    let db = Database::connect(&store_config(cli))
        .await
        .context("Failed to initialize database")?;
    db.close().await;
    Ok(())
}

/// Show database status
pub async fn show_status(cli: &Cli) -> Result<()> {
    if !cli.db.exists() {
        println!("❌ Database not found at {:?}", cli.db);
        println!("   Run 'atm init' to create the database");
        return Ok(());
    }

    let db = Database::connect(&store_config(cli)).await?;

    let accounts = AccountRepo::count(db.pool()).await?;
    let transactions = TransactionRepo::count(db.pool()).await?;

    println!("📊 Database Status");
    println!("   Path:         {:?}", cli.db);
    println!("   Accounts:     {}", accounts);
    println!("   Transactions: {}", transactions);

    db.close().await;
    Ok(())
}

/// Connect and build the service context
pub async fn connect(cli: &Cli) -> Result<ServiceContext> {
    let db = Database::connect(&store_config(cli))
        .await
        .context("Failed to connect to database. Run 'atm init' first.")?;

    let mut ctx = ServiceContext::new(db);
    if let Some(secs) = cli.session_ttl_secs {
        ctx = ctx.with_session_ttl(chrono::Duration::seconds(secs));
    }
    Ok(ctx)
}
