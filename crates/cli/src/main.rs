//! ATM CLI - ledger operations from the command line
//!
//! Usage:
//! ```bash
//! atm init
//! atm register --name alice --pin 1234
//! atm deposit --name alice --pin 1234 50000
//! atm transfer --name alice --pin 1234 2 20000
//! atm history --name alice --pin 1234 --type transfer_out
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod db;

use commands::{account, money};

impl Commands {
    /// Subcommand name as typed on the command line.
    fn name(&self) -> &'static str {
        match self {
            Commands::Init { .. } => "init",
            Commands::Status => "status",
            Commands::Register { .. } => "register",
            Commands::Login { .. } => "login",
            Commands::Balance { .. } => "balance",
            Commands::Profile { .. } => "profile",
            Commands::ChangePin { .. } => "change-pin",
            Commands::Deposit { .. } => "deposit",
            Commands::Withdraw { .. } => "withdraw",
            Commands::Transfer { .. } => "transfer",
            Commands::History { .. } => "history",
            Commands::Reconcile { .. } => "reconcile",
        }
    }
}

/// ATM - account balances and a transaction ledger on SQLite
#[derive(Parser)]
#[command(name = "atm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file path
    #[arg(long, env = "ATM_DB", default_value = "data/atm.db", global = true)]
    pub db: PathBuf,

    /// Connection pool size
    #[arg(long, env = "ATM_MAX_CONNECTIONS", default_value_t = 5, global = true)]
    pub max_connections: u32,

    /// How long to wait for another terminal's write lock (milliseconds)
    #[arg(long, env = "ATM_BUSY_TIMEOUT_MS", default_value_t = 5000, global = true)]
    pub busy_timeout_ms: u64,

    /// Session lifetime in seconds; unlimited when omitted
    #[arg(long, env = "ATM_SESSION_TTL_SECS", global = true)]
    pub session_ttl_secs: Option<i64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Login details for commands that act on an account
#[derive(Args, Clone)]
pub struct Credentials {
    /// Account name
    #[arg(long, short)]
    pub name: String,
    /// Account PIN
    #[arg(long, short, env = "ATM_PIN", hide_env_values = true)]
    pub pin: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and apply the schema
    Init {
        /// Remove an existing database first
        #[arg(long)]
        force: bool,
    },

    /// Show database status
    Status,

    /// Open a new account
    Register {
        /// Account name (must be unique)
        #[arg(long, short)]
        name: String,
        /// PIN
        #[arg(long, short)]
        pin: String,
    },

    /// Check credentials
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Show the current balance
    Balance {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Show account id, name and balance
    Profile {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Deposit funds
    Deposit {
        #[command(flatten)]
        credentials: Credentials,
        /// Amount to deposit
        amount: Decimal,
    },

    /// Withdraw funds
    Withdraw {
        #[command(flatten)]
        credentials: Credentials,
        /// Amount to withdraw
        amount: Decimal,
    },

    /// Transfer funds to another account
    Transfer {
        #[command(flatten)]
        credentials: Credentials,
        /// Target account ID
        target_id: i64,
        /// Amount to transfer
        amount: Decimal,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Change the PIN
    ChangePin {
        #[command(flatten)]
        credentials: Credentials,
        /// New PIN
        #[arg(long)]
        new_pin: String,
    },

    /// Show transaction history
    History {
        #[command(flatten)]
        credentials: Credentials,
        /// all, deposit, withdraw, transfer_in or transfer_out
        #[arg(long = "type", short = 't', default_value = "all")]
        filter: atm_core::HistoryFilter,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Compare the balance with the sum of the ledger
    Reconcile {
        #[command(flatten)]
        credentials: Credentials,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Ensure data directory exists
    if let Some(parent) = cli.db.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {:?}", parent))?;
    }

    let command = cli.command.name();
    debug!(command, db = ?cli.db, "running command");
    if let Err(e) = run(&cli).await {
        error!(command, error = %e, "command failed");
        return Err(e);
    }
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    match cli.command {
        Commands::Init { force } => {
            db::init_database(cli, force).await?;
            println!("✅ Database initialized at {:?}", cli.db);
        }

        Commands::Status => {
            db::show_status(cli).await?;
        }

        Commands::Register { ref name, ref pin } => {
            let ctx = db::connect(cli).await?;
            account::register(&ctx, name, pin).await?;
        }

        Commands::Login { ref credentials } => {
            let ctx = db::connect(cli).await?;
            account::login(&ctx, credentials).await?;
        }

        Commands::Balance { ref credentials } => {
            let ctx = db::connect(cli).await?;
            account::balance(&ctx, credentials).await?;
        }

        Commands::Profile { ref credentials } => {
            let ctx = db::connect(cli).await?;
            account::profile(&ctx, credentials).await?;
        }

        Commands::ChangePin {
            ref credentials,
            ref new_pin,
        } => {
            let ctx = db::connect(cli).await?;
            account::change_pin(&ctx, credentials, new_pin).await?;
        }

        Commands::Deposit {
            ref credentials,
            amount,
        } => {
            let ctx = db::connect(cli).await?;
            money::deposit(&ctx, credentials, amount).await?;
        }

        Commands::Withdraw {
            ref credentials,
            amount,
        } => {
            let ctx = db::connect(cli).await?;
            money::withdraw(&ctx, credentials, amount).await?;
        }

        Commands::Transfer {
            ref credentials,
            target_id,
            amount,
            yes,
        } => {
            let ctx = db::connect(cli).await?;
            money::transfer(&ctx, credentials, target_id, amount, yes).await?;
        }

        Commands::History {
            ref credentials,
            filter,
            json,
        } => {
            let ctx = db::connect(cli).await?;
            money::history(&ctx, credentials, filter, json).await?;
        }

        Commands::Reconcile { ref credentials } => {
            let ctx = db::connect(cli).await?;
            money::reconcile(&ctx, credentials).await?;
        }
    }

    Ok(())
}
