//! Content sources: per-site fetch, parse, and session bootstrap.
//!
//! A [`Source`] is a content site that can serve a page from which the
//! primary identity fields of a record (title, cover URL) are extracted.
//! Sites gate their content endpoints behind warmed sessions, so every
//! source carries an in-memory cookie that it can self-heal through
//! [`Source::bootstrap_session`].
//!
//! # Module layout
//!
//! - [`client`] -- Shared per-site HTTP plumbing ([`SiteClient`]).
//! - [`avtoday`] / [`jable`] -- Concrete site implementations.
//! - [`manager`] -- Orchestration of cache, fallback chain, and persistence.

pub mod avtoday;
pub mod client;
pub mod jable;
pub mod manager;

use std::path::Path;

use async_trait::async_trait;

use avmeta_db::models::AvInfo;

pub use avtoday::Avtoday;
pub use client::SiteClient;
pub use jable::Jable;
pub use manager::SourceManager;

/// Async trait implemented by every content site.
///
/// Implementations are shared across tasks behind an `Arc`, so all methods
/// take `&self`; the only interior mutability is the session cookie.
#[async_trait]
pub trait Source: Send + Sync {
    /// Stable identifier, used as the cache/cookie key and as the `source`
    /// field of produced records.
    fn name(&self) -> &'static str;

    /// Fetch the site's page for an avid, trying each mirror URL in order.
    ///
    /// Returns the response body on a 2xx status; any network or status
    /// error is logged and yields `None`.
    async fn fetch_page(&self, avid: &str) -> Option<String>;

    /// Extract a record from a fetched page.
    ///
    /// Missing title or cover URL fails the whole parse; no partial record
    /// is ever produced.
    fn parse(&self, avid: &str, html: &str) -> Option<AvInfo>;

    /// Acquire a fresh session cookie from the site's home page.
    ///
    /// Makes up to the configured number of attempts, persisting the cookie
    /// on first success. Returns `false` when every attempt fails.
    async fn bootstrap_session(&self) -> bool;

    /// Stream a file (cover image) to `dest`, creating parent directories.
    ///
    /// Writes via a temp file and renames into place, so a failure leaves no
    /// truncated file behind. Returns `false` on any failure.
    async fn download_file(&self, url: &str, dest: &Path, referer: Option<&str>) -> bool;

    /// Prime the in-memory session cookie (manager start-up, manual override).
    fn set_cookie(&self, cookie: String);
}
