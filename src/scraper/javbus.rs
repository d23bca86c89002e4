//! Javbus-family enrichment scraper.
//!
//! Javbus and its mirror domains serve the same detail-page markup, so one
//! implementation covers the whole family; each registered instance differs
//! only in name and base URL.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use avmeta_db::models::ScrapedMetadata;

use crate::config::HttpConfig;
use crate::extract::first_capture;
use crate::http::build_client;

use super::Scraper;

/// Release date patterns, tried in order.
const RELEASE_DATE_PATTERNS: &[&str] = &[
    r#"<span class="header">發行日期:</span>\s*([0-9]{4}-[0-9]{2}-[0-9]{2})"#,
    r"發行日期:\s*</span>\s*([0-9]{4}-[0-9]{2}-[0-9]{2})",
];

/// Duration patterns.
const DURATION_PATTERNS: &[&str] = &[r#"<span class="header">長度:</span>\s*([^<]+)"#];

/// Director patterns; the director name is linked on the detail page.
const DIRECTOR_PATTERNS: &[&str] = &[
    r#"<span class="header">導演:</span>\s*<a[^>]*>([^<]+)</a>"#,
    r#"<span class="header">導演:</span>\s*([^<]+)"#,
];

/// Cover patterns; `bigImage` links are site-relative.
const IMAGE_PATTERNS: &[&str] = &[
    r#"<a class="bigImage" href="([^"]+)""#,
    r#"<meta property="og:image" content="([^"]+)""#,
];

/// Scraper for the Javbus detail-page family.
pub struct JavbusScraper {
    scraper_name: &'static str,
    client: reqwest::Client,
    base_url: String,
}

impl JavbusScraper {
    pub fn javbus(http: &HttpConfig, proxy: Option<&str>) -> Result<Self> {
        Self::with_base_url("javbus", http, proxy, "https://www.javbus.com")
    }

    pub fn busdmm(http: &HttpConfig, proxy: Option<&str>) -> Result<Self> {
        Self::with_base_url("busdmm", http, proxy, "https://www.busdmm.shop")
    }

    pub fn dmmsee(http: &HttpConfig, proxy: Option<&str>) -> Result<Self> {
        Self::with_base_url("dmmsee", http, proxy, "https://www.dmmsee.art")
    }

    /// Build an instance for an arbitrary mirror (or a test server).
    pub fn with_base_url(
        scraper_name: &'static str,
        http: &HttpConfig,
        proxy: Option<&str>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            anyhow::bail!("Scraper base URL is empty");
        }

        Ok(Self {
            scraper_name,
            client: build_client(proxy, http.timeout())?,
            base_url,
        })
    }

    fn page_url(&self, avid: &str) -> String {
        format!("{}/{}", self.base_url, avid)
    }

    /// Expand a site-relative cover path into a full URL.
    fn absolutize(&self, url: String) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url
        }
    }
}

#[async_trait]
impl Scraper for JavbusScraper {
    fn name(&self) -> &'static str {
        self.scraper_name
    }

    async fn fetch_page(&self, avid: &str) -> Option<String> {
        let url = self.page_url(&avid.to_uppercase());
        debug!(scraper = self.scraper_name, url = %url, "Fetching scraper page");

        let result = async {
            self.client
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
        }
        .await;

        match result {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(scraper = self.scraper_name, url = %url, error = %e, "Scraper fetch failed");
                None
            }
        }
    }

    fn parse(&self, html: &str, _avid: &str) -> Option<ScrapedMetadata> {
        let scraped = ScrapedMetadata {
            release_date: first_capture(html, RELEASE_DATE_PATTERNS),
            duration: first_capture(html, DURATION_PATTERNS),
            director: first_capture(html, DIRECTOR_PATTERNS),
            image_url: first_capture(html, IMAGE_PATTERNS).map(|url| self.absolutize(url)),
        };

        (!scraped.is_empty()).then_some(scraped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> JavbusScraper {
        JavbusScraper::javbus(&HttpConfig::default(), None).unwrap()
    }

    const DETAIL_PAGE: &str = r#"
        <a class="bigImage" href="/pics/cover/abc123_b.jpg"><img src="/pics/cover/abc123_b.jpg"></a>
        <p><span class="header">發行日期:</span> 2024-05-01</p>
        <p><span class="header">長度:</span> 120分鐘</p>
        <p><span class="header">導演:</span> <a href="/director/xyz">某導演</a></p>
    "#;

    #[test]
    fn parse_detail_page() {
        let scraped = scraper().parse(DETAIL_PAGE, "ABC-123").unwrap();
        assert_eq!(scraped.release_date.as_deref(), Some("2024-05-01"));
        assert_eq!(scraped.duration.as_deref(), Some("120分鐘"));
        assert_eq!(scraped.director.as_deref(), Some("某導演"));
        assert_eq!(
            scraped.image_url.as_deref(),
            Some("https://www.javbus.com/pics/cover/abc123_b.jpg")
        );
    }

    #[test]
    fn parse_partial_page_keeps_found_fields() {
        let html = r#"<p><span class="header">發行日期:</span> 2024-05-01</p>"#;
        let scraped = scraper().parse(html, "ABC-123").unwrap();
        assert_eq!(scraped.release_date.as_deref(), Some("2024-05-01"));
        assert!(scraped.director.is_none());
    }

    #[test]
    fn parse_empty_page_is_miss() {
        assert!(scraper().parse("<html></html>", "ABC-123").is_none());
    }

    #[test]
    fn absolute_cover_url_untouched() {
        let html = r#"<meta property="og:image" content="https://cdn/covers/x.jpg">"#;
        let scraped = scraper().parse(html, "ABC-123").unwrap();
        assert_eq!(scraped.image_url.as_deref(), Some("https://cdn/covers/x.jpg"));
    }

    #[test]
    fn page_url_uppercases_avid() {
        assert_eq!(
            scraper().page_url("ABC-123"),
            "https://www.javbus.com/ABC-123"
        );
    }

    #[test]
    fn mirror_constructors_differ_only_in_identity() {
        let busdmm = JavbusScraper::busdmm(&HttpConfig::default(), None).unwrap();
        assert_eq!(busdmm.name(), "busdmm");
        assert_eq!(busdmm.base_url, "https://www.busdmm.shop");

        let dmmsee = JavbusScraper::dmmsee(&HttpConfig::default(), None).unwrap();
        assert_eq!(dmmsee.name(), "dmmsee");
    }
}
