//! Avmeta-DB: database schema, migrations, and query operations
//!
//! This crate provides the persistence layer for avmeta using SQLite with
//! rusqlite and r2d2 connection pooling. Two tables are managed: `AVInfo`,
//! the resolved-metadata cache keyed on `(avid, source)`, and `SourceCookie`,
//! the per-source session-cookie cache keyed on `source`.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching the database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use avmeta_db::pool::{init_pool, get_conn};
//! use avmeta_db::queries::av_info;
//!
//! let pool = init_pool("/var/lib/avmeta/avmeta.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let cached = av_info::get(&conn, "ABC-123", None).unwrap();
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
