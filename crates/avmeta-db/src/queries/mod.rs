//! Database query operations.
//!
//! Each submodule covers one table. All functions take a borrowed
//! [`rusqlite::Connection`] checked out from the pool by the caller.

pub mod av_info;
pub mod cookies;
