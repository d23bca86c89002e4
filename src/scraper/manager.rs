//! Scraper registry and fallback chain.

use std::sync::Arc;

use tracing::{info, warn};

use avmeta_db::models::ScrapedMetadata;

use super::Scraper;

/// Ordered registry of enrichment scrapers, independent of the source list.
pub struct ScraperManager {
    scrapers: Vec<Arc<dyn Scraper>>,
}

impl ScraperManager {
    /// Build the registry; registration order is the fallback order.
    pub fn new(scrapers: Vec<Arc<dyn Scraper>>) -> Self {
        for scraper in &scrapers {
            info!(scraper = scraper.name(), "Registered scraper");
        }
        Self { scrapers }
    }

    /// Names of all registered scrapers, in fallback order.
    pub fn names(&self) -> Vec<&'static str> {
        self.scrapers.iter().map(|scraper| scraper.name()).collect()
    }

    /// Try every scraper in order and return the first non-empty payload.
    pub async fn scrape(&self, avid: &str) -> Option<ScrapedMetadata> {
        let avid = avid.to_uppercase();
        for scraper in &self.scrapers {
            if let Some(scraped) = scraper.scrape(&avid).await {
                return Some(scraped);
            }
        }
        warn!(avid = %avid, "No scraper produced enrichment metadata");
        None
    }

    /// Scrape through one named scraper only.
    pub async fn scrape_from(&self, avid: &str, scraper_name: &str) -> Option<ScrapedMetadata> {
        let avid = avid.to_uppercase();
        let Some(scraper) = self
            .scrapers
            .iter()
            .find(|scraper| scraper.name().eq_ignore_ascii_case(scraper_name))
        else {
            warn!(scraper = scraper_name, "Unknown scraper");
            return None;
        };
        scraper.scrape(&avid).await
    }
}
