//! Shared HTTP plumbing for content sources.
//!
//! Concrete sources compose a [`SiteClient`] rather than reimplementing
//! fetch, bootstrap, and download logic. The client owns the in-memory
//! session cookie for its site and persists refreshed cookies through the
//! cookie cache.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, COOKIE, REFERER, SET_COOKIE};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use avmeta_db::models::SourceCookie;
use avmeta_db::pool::{get_conn, DbPool};
use avmeta_db::queries::cookies;

use crate::config::HttpConfig;
use crate::http::build_client;

/// Per-site HTTP client with session-cookie state and bootstrap retry policy.
pub struct SiteClient {
    client: reqwest::Client,
    base_url: String,
    cookie: RwLock<Option<String>>,
    cookie_retry_times: u32,
    retry_interval: Duration,
    pool: DbPool,
}

impl SiteClient {
    /// Create a client for one site.
    ///
    /// An empty `base_url` is a programming error in the source definition
    /// and fails construction.
    pub fn new(
        pool: DbPool,
        http: &HttpConfig,
        proxy: Option<&str>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            anyhow::bail!("Source base URL is empty");
        }

        Ok(Self {
            client: build_client(proxy, http.timeout())?,
            base_url,
            cookie: RwLock::new(None),
            cookie_retry_times: http.cookie_retry_times,
            retry_interval: http.retry_interval(),
            pool,
        })
    }

    /// Scheme plus host of the site, no trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the in-memory session cookie.
    pub fn set_cookie(&self, cookie: String) {
        *self.cookie.write() = Some(cookie);
    }

    /// Current in-memory session cookie, if any.
    pub fn cookie(&self) -> Option<String> {
        self.cookie.read().clone()
    }

    /// GET a page, attaching the session cookie and optional referer.
    ///
    /// Failures are logged and collapse to `None`; a failing site is just a
    /// candidate that produced nothing.
    pub async fn fetch_html(&self, url: &str, referer: Option<&str>) -> Option<String> {
        debug!(url = url, "Fetching page");
        match self.try_fetch(url, referer).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(url = url, error = %e, "Page fetch failed");
                None
            }
        }
    }

    async fn try_fetch(&self, url: &str, referer: Option<&str>) -> Result<String> {
        let mut request = self.client.get(url);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }
        if let Some(cookie) = self.cookie() {
            request = request.header(COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request failed: {}", url))?
            .error_for_status()
            .with_context(|| format!("Request returned error status: {}", url))?;

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body: {}", url))
    }

    /// Fetch a content page through the mirror URL list, self-healing the
    /// session when needed.
    ///
    /// Each URL is tried in order. When all fail -- a cold client with no
    /// cookie yet, or an expired session -- the session is bootstrapped once
    /// and the list is retried. Callers never deal with session state.
    pub async fn fetch_page_with_session(
        &self,
        source_name: &str,
        urls: &[String],
        referer: Option<&str>,
    ) -> Option<String> {
        for url in urls {
            if let Some(html) = self.fetch_html(url, referer).await {
                return Some(html);
            }
        }

        if !self.bootstrap(source_name).await {
            return None;
        }

        for url in urls {
            if let Some(html) = self.fetch_html(url, referer).await {
                return Some(html);
            }
        }
        None
    }

    /// Acquire a fresh session cookie from the site's home page.
    ///
    /// Each attempt is preceded by the fixed retry delay. On the first 2xx
    /// response the `Set-Cookie` headers are serialized to a single string,
    /// persisted to the cookie cache, and installed as the active session
    /// cookie. Returns `false` when every attempt fails.
    pub async fn bootstrap(&self, source_name: &str) -> bool {
        let home_url = format!("{}/", self.base_url);

        for attempt in 1..=self.cookie_retry_times {
            sleep(self.retry_interval).await;
            info!(
                source = source_name,
                attempt,
                total = self.cookie_retry_times,
                "Bootstrapping session cookie"
            );

            let response = match self.client.get(&home_url).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(source = source_name, error = %e, "Bootstrap request failed");
                    continue;
                }
            };
            if !response.status().is_success() {
                warn!(
                    source = source_name,
                    status = %response.status(),
                    "Bootstrap request rejected"
                );
                continue;
            }

            let cookie = serialize_cookies(response.headers());
            let row = SourceCookie {
                source: source_name.to_string(),
                cookie: cookie.clone(),
            };
            match get_conn(&self.pool) {
                Ok(conn) => {
                    if let Err(e) = cookies::upsert(&conn, &row) {
                        warn!(source = source_name, error = %e, "Failed to persist session cookie");
                    }
                }
                Err(e) => {
                    warn!(source = source_name, error = %e, "Failed to get connection for cookie");
                }
            }

            self.set_cookie(cookie);
            info!(source = source_name, "Session cookie acquired");
            return true;
        }

        warn!(
            source = source_name,
            attempts = self.cookie_retry_times,
            "Session bootstrap exhausted all attempts"
        );
        false
    }

    /// Download a file to `dest`, creating parent directories as needed.
    ///
    /// The body is written to a temp file in the destination directory and
    /// renamed into place on success. Returns `false` on any failure.
    pub async fn download(&self, url: &str, dest: &Path, referer: Option<&str>) -> bool {
        match self.try_download(url, dest, referer).await {
            Ok(()) => true,
            Err(e) => {
                warn!(url = url, dest = %dest.display(), error = %e, "Download failed");
                false
            }
        }
    }

    async fn try_download(&self, url: &str, dest: &Path, referer: Option<&str>) -> Result<()> {
        let mut request = self.client.get(url);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }
        if let Some(cookie) = self.cookie() {
            request = request.header(COOKIE, cookie);
        }

        let bytes = request
            .send()
            .await
            .with_context(|| format!("Download request failed: {}", url))?
            .error_for_status()
            .with_context(|| format!("Download returned error status: {}", url))?
            .bytes()
            .await
            .with_context(|| format!("Failed to read download body: {}", url))?;

        let parent = dest
            .parent()
            .with_context(|| format!("Destination has no parent directory: {}", dest.display()))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .context("Failed to create temporary download file")?;
        tmp.write_all(&bytes)
            .context("Failed to write download body")?;
        tmp.persist(dest)
            .with_context(|| format!("Failed to move download into place: {}", dest.display()))?;

        Ok(())
    }
}

/// Serialize response `Set-Cookie` headers into a single `Cookie` header
/// value, `"k1=v1; k2=v2"`. Attributes after the first `;` are dropped.
fn serialize_cookies(headers: &HeaderMap) -> String {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}
