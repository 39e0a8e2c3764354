//! # Pool and Handle
//!
//! Opens the SQLite store the storefront runs on and hands out
//! repositories.
//!
//! ```text
//! DATABASE_URL ──► DbConfig::from_url() ──► Database::new()
//!                                              │
//!                   ┌──────────────────────────┼──────────────────────────┐
//!                   │ file:   WAL, synchronous=NORMAL, N connections      │
//!                   │ memory: one connection that is never reaped         │
//!                   │ both:   foreign_keys=ON, busy_timeout, migrations   │
//!                   └──────────────────────────┬──────────────────────────┘
//!                                              ▼
//!                      db.products() / db.users() / db.orders()
//! ```
//!
//! An in-memory database lives exactly as long as its connection, so the
//! in-memory profile pins the pool at one connection with no idle reaping.
//! Every repository call and every transaction then shares that one
//! connection.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;
use crate::repository::user::UserRepository;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// How to open the store.
///
/// ## Example
/// ```rust
/// use storefront_db::DbConfig;
///
/// let config = DbConfig::from_url("sqlite://storefront.db").max_connections(5);
/// assert_eq!(config.database_path.to_str(), Some("storefront.db"));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`
    pub database_path: PathBuf,

    /// Pool ceiling (default 5, always 1 in memory)
    pub max_connections: u32,

    /// Connections kept open while idle (default 1)
    pub min_connections: u32,

    /// How long `acquire` waits for a free connection
    pub acquire_timeout: Duration,

    /// How long a statement waits on another connection's write lock
    pub busy_timeout: Duration,

    /// Idle connections are closed after this; `None` never closes them
    pub idle_timeout: Option<Duration>,

    /// Apply pending migrations when the pool opens (default true)
    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed store at `path`, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(10),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Creates a configuration from a `DATABASE_URL` style string.
    ///
    /// Accepts `sqlite://path`, `sqlite:path`, a bare path, or
    /// `:memory:`. Query parameters are ignored.
    pub fn from_url(url: &str) -> Self {
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        let path = path.split('?').next().unwrap_or(path);

        if path == MEMORY_PATH {
            DbConfig::in_memory()
        } else {
            DbConfig::new(path)
        }
    }

    /// Caps the pool size. A no-op for in-memory stores.
    pub fn max_connections(mut self, max: u32) -> Self {
        if !self.is_in_memory() {
            self.max_connections = max.max(1);
            self.min_connections = self.min_connections.min(self.max_connections);
        }
        self
    }

    /// Private in-memory store. Each call opens an empty database; tests
    /// use one per case.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    /// True for `:memory:` stores.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };

        Ok(options.foreign_keys(true).busy_timeout(self.busy_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Open store. Clones share the pool.
///
/// ## Usage in Handlers
/// ```rust,ignore
/// async fn get_product(
///     State(state): State<Arc<AppState>>,
///     Path(id): Path<i64>,
/// ) -> Result<Json<ProductResponse>, ApiError> {
///     let product = state.db.products().get_by_id(id).await?;
///     ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, migrates the schema.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            in_memory = config.is_in_memory(),
            "Opening storefront database"
        );

        let options = config.connect_options()?;
        debug!(
            max = config.max_connections,
            min = config.min_connections,
            "Pool sizing"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool, for diagnostics and the seed tool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Catalog Store.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Identity Store.
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Order Engine.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections and closes the pool. Later calls
    /// through any clone fail.
    pub async fn close(&self) {
        info!("Closing storefront database");
        self.pool.close().await;
    }

    /// `SELECT 1` round-trip.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
