//! SQLite connection pool shared by the repositories.
//!
//! The pool is opened once at startup. A database file that cannot be opened
//! is replaced by an in-memory database; when no pool was opened at all the
//! repositories keep their data in process memory.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::migrations::run_sqlite_migrations;

pub const DEFAULT_SQLITE_PATH: &str = "data/somara.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    #[error("Cannot prepare the database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database pool is already initialized")]
    PoolAlreadyInitialized,

    #[error("Database pool is not initialized")]
    PoolNotInitialized,

    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Database error: {0}")]
    GenericError(String),
}

/// Backends accepted in `DB_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    Sqlite,
}

impl FromStr for DatabaseType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("sqlite") {
            Ok(DatabaseType::Sqlite)
        } else {
            Err(DatabaseError::UnsupportedDatabaseType(s.to_string()))
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub db_type: DatabaseType,
    pub sqlite_path: String,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: DEFAULT_SQLITE_PATH.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

impl DatabaseConfig {
    /// Read `DB_TYPE`, `DB_SQLITE_PATH`, `DB_MAX_CONNECTIONS` and
    /// `DB_TIMEOUT_SECONDS`
    pub fn from_env() -> Result<Self, DatabaseError> {
        let db_type = env::var("DB_TYPE")
            .unwrap_or_else(|_| "sqlite".to_string())
            .parse::<DatabaseType>()?;

        let sqlite_path = env::var("DB_SQLITE_PATH").unwrap_or_else(|_| {
            info!("DB_SQLITE_PATH not set, using {}", DEFAULT_SQLITE_PATH);
            DEFAULT_SQLITE_PATH.to_string()
        });

        Ok(Self {
            db_type,
            sqlite_path,
            max_connections: env_or("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            timeout_seconds: env_or("DB_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS),
        })
    }
}

/// Pooled connections to the class and profile store
#[derive(Debug, Clone)]
pub enum DatabasePool {
    SQLite(Arc<SqlitePool>),
}

impl DatabasePool {
    /// Migrated in-memory database.
    ///
    /// Every in-memory SQLite connection is a separate database, so the pool
    /// holds exactly one connection.
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())?;
        let pool = DatabasePool::SQLite(Arc::new(pool));
        pool.migrate()?;
        Ok(pool)
    }

    /// Open (creating if needed) the database file named in `config`
    pub fn open_file(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let path = Path::new(&config.sqlite_path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty() && !d.exists()) {
            info!("Creating database directory {}", dir.display());
            fs::create_dir_all(dir)?;
        }

        let manager = SqliteConnectionManager::file(path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);
        let pool = r2d2::Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(Duration::from_secs(config.timeout_seconds))
            .build(manager)?;

        // Fail here rather than on the first request
        pool.get()?;
        Ok(DatabasePool::SQLite(Arc::new(pool)))
    }

    /// Create the tables and indexes if they are missing
    pub fn migrate(&self) -> Result<(), DatabaseError> {
        match self {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)
            }
        }
    }
}

/// Open the global pool from the environment and migrate it
pub fn initialize_database_pool() -> Result<(), DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    let config = DatabaseConfig::from_env()?;
    debug!("Database configuration: {:?}", config);

    let pool = match config.db_type {
        DatabaseType::Sqlite => match DatabasePool::open_file(&config) {
            Ok(pool) => {
                info!("Opened SQLite database at {}", config.sqlite_path);
                pool
            }
            Err(e) => {
                warn!("Cannot open {} ({}), using an in-memory database", config.sqlite_path, e);
                DatabasePool::in_memory()?
            }
        },
    };
    pool.migrate()?;

    DB_POOL.set(pool).map_err(|_| DatabaseError::PoolAlreadyInitialized)
}

pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    DB_POOL.get().cloned().ok_or(DatabaseError::PoolNotInitialized)
}

/// Describe the global pool, if one was opened
pub fn get_connection_info() -> Option<String> {
    DB_POOL.get().map(describe_pool)
}

/// One-line summary of a pool for the health report. Healthy pools say
/// "healthy"; anything else is a connection error.
pub fn describe_pool(pool: &DatabasePool) -> String {
    match pool {
        DatabasePool::SQLite(pool) => {
            let conn = match pool.get() {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Failed to get SQLite connection: {}", e);
                    return format!("SQLite connection error: {}", e);
                }
            };

            let file: Option<String> = conn
                .query_row("PRAGMA database_list", [], |row| row.get(2))
                .ok();
            let location = match file.as_deref() {
                None => "SQLite database (path unknown)".to_string(),
                Some("") | Some(":memory:") => "SQLite in-memory database".to_string(),
                Some(path) => format!("SQLite database at {}", path),
            };

            let state = pool.state();
            format!(
                "{} healthy (connections: active={}, idle={})",
                location, state.connections, state.idle_connections
            )
        }
    }
}
