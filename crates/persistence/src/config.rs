//! Store connection settings.

use std::time::Duration;

/// Default on-disk database location.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/atm.db";

/// Connection settings for the ledger store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database URL (e.g. `sqlite:data/atm.db`, `sqlite::memory:`)
    pub database_url: String,
    pub max_connections: u32,
    /// How long a unit waits for another unit's write lock before failing.
    pub busy_timeout: Duration,
    pub create_if_missing: bool,
    /// WAL lets readers proceed while one writer holds the lock.
    pub wal: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
            create_if_missing: true,
            wal: true,
        }
    }
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Private in-memory store. Limited to one connection since every
    /// SQLite connection to `:memory:` opens its own database.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            wal: false,
            ..Self::default()
        }
    }

    /// Store backed by a file path.
    pub fn for_path(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(format!("sqlite:{}", path.as_ref().display()))
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}
