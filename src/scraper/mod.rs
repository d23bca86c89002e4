//! Enrichment scrapers: stateless secondary metadata sites.
//!
//! A [`Scraper`] serves enrichment-only fields (release date, duration,
//! director) from static pages. Unlike a [`Source`](crate::source::Source)
//! there is no session or cookie state; a scrape is one GET plus one parse.

pub mod javbus;
pub mod manager;

use async_trait::async_trait;
use tracing::info;

use avmeta_db::models::ScrapedMetadata;

pub use javbus::JavbusScraper;
pub use manager::ScraperManager;

/// Async trait implemented by every enrichment site.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Stable identifier for logging and targeted scrapes.
    fn name(&self) -> &'static str;

    /// Fetch the site's page for an avid. Failures are logged and yield
    /// `None`.
    async fn fetch_page(&self, avid: &str) -> Option<String>;

    /// Extract enrichment fields from a fetched page.
    fn parse(&self, html: &str, avid: &str) -> Option<ScrapedMetadata>;

    /// Fetch and parse in one step; an empty payload counts as a miss.
    async fn scrape(&self, avid: &str) -> Option<ScrapedMetadata> {
        let avid = avid.to_uppercase();
        let html = self.fetch_page(&avid).await?;
        match self.parse(&html, &avid) {
            Some(scraped) if !scraped.is_empty() => {
                info!(scraper = self.name(), avid = %avid, "Scraped enrichment metadata");
                Some(scraped)
            }
            _ => None,
        }
    }
}
