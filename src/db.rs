//! SQLite connection pool and embedded migrations for the document store.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{error, info};

use crate::repository::errors::{RepositoryError, RepositoryResult};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Pragmas applied to every connection handed out by the pool.
#[derive(Debug, Clone)]
pub struct SqlitePragmas {
    /// Write-ahead journal with `synchronous = NORMAL`.
    pub wal: bool,
    pub busy_timeout: Duration,
}

impl Default for SqlitePragmas {
    fn default() -> Self {
        Self {
            wal: true,
            busy_timeout: Duration::from_secs(30),
        }
    }
}

impl SqlitePragmas {
    fn statements(&self) -> String {
        let mut sql = String::new();
        if self.wal {
            sql.push_str("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; ");
        }
        sql.push_str(&format!(
            "PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ));
        sql
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&self.statements())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the pool for `database_url` with the default pragmas.
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, PoolError> {
    Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas::default()))
        .build(ConnectionManager::<SqliteConnection>::new(database_url))
}

pub fn get_connection(pool: &DbPool) -> Result<DbConnection, PoolError> {
    pool.get().inspect_err(|e| error!("Failed to get connection from pool: {e}"))
}

/// Applies every pending embedded migration.
pub fn run_migrations(pool: &DbPool) -> RepositoryResult<()> {
    let mut conn = get_connection(pool)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| RepositoryError::DatabaseError(format!("Migration failed: {e}")))?;
    if !applied.is_empty() {
        info!("Applied {} database migration(s)", applied.len());
    }
    Ok(())
}
