//! Database connection pool management.
//!
//! Connection pooling for SQLite using r2d2. Each resolution request checks
//! a connection out per operation, which is what makes concurrent requests
//! safe against the single-writer nature of SQLite.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use avmeta_common::{Error, Result};

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Initialize a new database pool with the given file path.
///
/// Creates the SQLite database file if it doesn't exist, sets a busy timeout
/// on every connection so concurrent upserts queue instead of failing, and
/// runs pending migrations.
///
/// # Example
///
/// ```no_run
/// use avmeta_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/avmeta/avmeta.db").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.execute_batch("PRAGMA busy_timeout = 5000;"));

    build_pool(manager)
}

/// Initialize an in-memory database pool for testing.
///
/// The pool is restricted to a single connection so every checkout sees the
/// same in-memory database.
///
/// # Example
///
/// ```
/// use avmeta_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory();

    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create in-memory pool: {}", e)))?;

    run_pool_migrations(&pool)?;

    Ok(pool)
}

fn build_pool(manager: SqliteConnectionManager) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    run_pool_migrations(&pool)?;

    Ok(pool)
}

fn run_pool_migrations(pool: &DbPool) -> Result<()> {
    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {}", e)))?;

    migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

    Ok(())
}

/// Get a connection from the pool.
///
/// Convenience wrapper around `pool.get()` that converts the r2d2 error into
/// our common Error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_memory_pool_runs_migrations() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='AVInfo'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn pool_shares_memory_database() {
        let pool = init_memory_pool().unwrap();

        {
            let conn = get_conn(&pool).unwrap();
            conn.execute(
                "INSERT INTO SourceCookie (source, cookie) VALUES ('avtoday', 'sid=1')",
                [],
            )
            .unwrap();
        }

        let conn = get_conn(&pool).unwrap();
        let cookie: String = conn
            .query_row(
                "SELECT cookie FROM SourceCookie WHERE source = 'avtoday'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(cookie, "sid=1");
    }

    #[test]
    fn file_pool_sets_busy_timeout() {
        let dir = std::env::temp_dir().join("avmeta-pool-test");
        std::fs::create_dir_all(&dir).unwrap();
        let db_path = dir.join("busy.db");
        let pool = init_pool(&db_path.to_string_lossy()).unwrap();
        let conn = get_conn(&pool).unwrap();

        let timeout: i64 = conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 5000);

        drop(conn);
        drop(pool);
        let _ = std::fs::remove_file(db_path);
    }
}
