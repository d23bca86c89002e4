//! Orchestration of the resolution pipeline.
//!
//! [`SourceManager`] owns the ordered source list and drives one resolution
//! request through its states: cache lookup, source fallback chain, then an
//! asynchronous save path that enriches the record through the scrapers,
//! downloads the cover, and upserts the cache row. The save path never gates
//! the caller's result.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use avmeta_db::models::{AvInfo, SourceCookie};
use avmeta_db::pool::{get_conn, DbPool};
use avmeta_db::queries::{av_info, cookies};

use crate::covers::CoverStore;
use crate::scraper::ScraperManager;

use super::Source;

/// Owns the source registry and the persistence side of resolution.
///
/// Cheap to clone; clones share the source instances, the scraper manager,
/// the pool, and the outstanding save-task list.
#[derive(Clone)]
pub struct SourceManager {
    sources: Vec<Arc<dyn Source>>,
    scrapers: Arc<ScraperManager>,
    covers: CoverStore,
    pool: DbPool,
    save_tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl SourceManager {
    /// Build the manager from its collaborators (composition root injects
    /// everything; there are no ambient globals).
    ///
    /// Registration order of `sources` is the fallback order. Each source's
    /// in-memory session cookie is primed from the cookie cache; a missing
    /// row leaves the source cookie-less until its own bootstrap runs.
    pub fn new(
        pool: DbPool,
        covers: CoverStore,
        scrapers: Arc<ScraperManager>,
        sources: Vec<Arc<dyn Source>>,
    ) -> Self {
        let manager = Self {
            sources,
            scrapers,
            covers,
            pool,
            save_tasks: Arc::new(Mutex::new(Vec::new())),
        };
        for source in &manager.sources {
            info!(source = source.name(), "Registered source");
        }
        manager.load_cookies();
        manager
    }

    fn load_cookies(&self) {
        let conn = match get_conn(&self.pool) {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "Failed to load session cookies");
                return;
            }
        };
        for source in &self.sources {
            match cookies::get(&conn, source.name()) {
                Ok(Some(row)) => {
                    source.set_cookie(row.cookie);
                    info!(source = source.name(), "Loaded session cookie from cache");
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(source = source.name(), error = %e, "Cookie lookup failed");
                }
            }
        }
    }

    /// Look up a registered source by name, case-insensitively.
    pub fn source(&self, name: &str) -> Option<&Arc<dyn Source>> {
        self.sources
            .iter()
            .find(|source| source.name().eq_ignore_ascii_case(name))
    }

    /// The cover image store.
    pub fn covers(&self) -> &CoverStore {
        &self.covers
    }

    /// Resolve an avid through the full pipeline.
    ///
    /// A cache hit returns immediately without touching any source. On a
    /// miss, sources are tried in registration order and the first parsed
    /// record wins; the save path (enrichment, cover download, upsert) is
    /// spawned in the background and the record is returned right away. When
    /// every source fails, nothing is cached and `None` is returned.
    pub async fn resolve(&self, avid: &str) -> Option<AvInfo> {
        let avid = avid.to_uppercase();

        if let Some(hit) = self.cache_get(&avid, None) {
            debug!(avid = %avid, source = %hit.source, "Cache hit");
            return Some(hit);
        }

        for source in &self.sources {
            info!(source = source.name(), avid = %avid, "Trying source");
            let Some(html) = source.fetch_page(&avid).await else {
                continue;
            };
            let Some(record) = source.parse(&avid, &html) else {
                warn!(source = source.name(), avid = %avid, "Page fetched but parse failed");
                continue;
            };

            info!(source = source.name(), avid = %avid, "Resolved metadata");
            self.spawn_save(record.clone());
            return Some(record);
        }

        warn!(avid = %avid, "No source produced metadata");
        None
    }

    /// Resolve an avid through one named source only.
    pub async fn resolve_from(&self, avid: &str, source_name: &str) -> Option<AvInfo> {
        let avid = avid.to_uppercase();

        let Some(source) = self.source(source_name) else {
            warn!(source = source_name, "Unknown source");
            return None;
        };

        if let Some(hit) = self.cache_get(&avid, Some(source.name())) {
            debug!(avid = %avid, source = source.name(), "Cache hit");
            return Some(hit);
        }

        let html = source.fetch_page(&avid).await?;
        let Some(record) = source.parse(&avid, &html) else {
            warn!(source = source.name(), avid = %avid, "Page fetched but parse failed");
            return None;
        };

        self.spawn_save(record.clone());
        Some(record)
    }

    /// Override a source's session cookie, in memory and in the cache.
    ///
    /// Returns `false` when the source is unknown; a cookie-cache write
    /// failure is logged but the in-memory override still counts as success.
    pub fn set_source_cookie(&self, source_name: &str, cookie: &str) -> bool {
        let Some(source) = self.source(source_name) else {
            warn!(source = source_name, "Unknown source");
            return false;
        };

        source.set_cookie(cookie.to_string());

        let row = SourceCookie {
            source: source.name().to_string(),
            cookie: cookie.to_string(),
        };
        match get_conn(&self.pool) {
            Ok(conn) => {
                if let Err(e) = cookies::upsert(&conn, &row) {
                    warn!(source = source.name(), error = %e, "Failed to persist session cookie");
                } else {
                    info!(source = source.name(), "Session cookie updated");
                }
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "Failed to get connection for cookie");
            }
        }
        true
    }

    /// Wait for all outstanding save tasks to finish.
    ///
    /// The resolve path spawns saves so callers are never gated on
    /// enrichment; shutdown (and tests) use this to flush them.
    pub async fn drain_saves(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut tasks = self.save_tasks.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *tasks)
        };
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Save task panicked");
            }
        }
    }

    fn cache_get(&self, avid: &str, source: Option<&str>) -> Option<AvInfo> {
        let conn = match get_conn(&self.pool) {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "Cache lookup skipped");
                return None;
            }
        };
        match av_info::get(&conn, avid, source) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(avid = %avid, error = %e, "Cache lookup failed");
                None
            }
        }
    }

    fn spawn_save(&self, record: AvInfo) {
        let manager = self.clone();
        let handle = tokio::spawn(async move {
            manager.save_resources(record).await;
        });
        self.save_tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(handle);
    }

    /// Enrich a freshly resolved record and persist it.
    ///
    /// Scraper enrichment merges in the secondary fields without overwriting
    /// an already-set cover URL. The cover download is skipped when the file
    /// already exists and its failure never blocks the metadata upsert.
    async fn save_resources(&self, mut record: AvInfo) {
        let avid = record.avid.clone();

        if let Some(scraped) = self.scrapers.scrape(&avid).await {
            record.apply_enrichment(&scraped);
            info!(avid = %avid, "Merged scraper enrichment");
        }

        match record.image_url.clone() {
            Some(image_url) => {
                let dest = self.covers.path_for(&avid);
                if dest.exists() {
                    debug!(avid = %avid, "Cover already present");
                } else if let Some(source) = self.source(&record.source) {
                    if !source.download_file(&image_url, &dest, None).await {
                        warn!(avid = %avid, url = %image_url, "Cover download failed");
                    }
                }
            }
            None => warn!(avid = %avid, "No cover URL to download"),
        }

        match get_conn(&self.pool) {
            Ok(conn) => {
                if let Err(e) = av_info::upsert(&conn, &record) {
                    warn!(avid = %avid, error = %e, "Failed to cache resolved metadata");
                }
            }
            Err(e) => {
                warn!(avid = %avid, error = %e, "Failed to get connection for metadata");
            }
        }
    }
}
