//! Avtoday content source.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use avmeta_db::models::AvInfo;
use avmeta_db::pool::DbPool;

use crate::config::HttpConfig;
use crate::extract::first_capture;

use super::{SiteClient, Source};

/// Title extraction patterns, tried in order.
const TITLE_PATTERNS: &[&str] = &[
    r#"<meta property="og:title" content="([^"]+)""#,
    r"<span>标题:</span>\s*<span>([^<]+)</span>",
];

/// Cover URL extraction patterns.
const IMAGE_PATTERNS: &[&str] = &[r#"<meta property="og:image" content="([^"]+)""#];

/// Source for `avtoday.io` video pages.
pub struct Avtoday {
    site: SiteClient,
}

impl Avtoday {
    pub const DOMAIN: &'static str = "avtoday.io";

    pub fn new(pool: DbPool, http: &HttpConfig, proxy: Option<&str>) -> Result<Self> {
        Self::with_base_url(pool, http, proxy, format!("https://{}", Self::DOMAIN))
    }

    /// Point the source at a mirror (or a test server).
    pub fn with_base_url(
        pool: DbPool,
        http: &HttpConfig,
        proxy: Option<&str>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            site: SiteClient::new(pool, http, proxy, base_url)?,
        })
    }

    fn page_urls(&self, avid: &str) -> Vec<String> {
        vec![format!("{}/video/{}", self.site.base_url(), avid)]
    }
}

#[async_trait]
impl Source for Avtoday {
    fn name(&self) -> &'static str {
        "avtoday"
    }

    async fn fetch_page(&self, avid: &str) -> Option<String> {
        let avid = avid.to_uppercase();
        let urls = self.page_urls(&avid);
        let html = self
            .site
            .fetch_page_with_session(self.name(), &urls, None)
            .await?;
        debug!(avid = %avid, "Fetched avtoday page");
        Some(html)
    }

    fn parse(&self, avid: &str, html: &str) -> Option<AvInfo> {
        let title = first_capture(html, TITLE_PATTERNS)?;
        let image_url = first_capture(html, IMAGE_PATTERNS)?;
        Some(AvInfo::from_source(avid, title, self.name(), image_url))
    }

    async fn bootstrap_session(&self) -> bool {
        self.site.bootstrap(self.name()).await
    }

    async fn download_file(&self, url: &str, dest: &Path, referer: Option<&str>) -> bool {
        self.site.download(url, dest, referer).await
    }

    fn set_cookie(&self, cookie: String) {
        self.site.set_cookie(cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avmeta_db::pool::init_memory_pool;

    fn source() -> Avtoday {
        Avtoday::new(init_memory_pool().unwrap(), &HttpConfig::default(), None).unwrap()
    }

    #[test]
    fn parse_og_tags() {
        let html = concat!(
            r#"<meta property="og:title" content="Sample Title">"#,
            r#"<meta property="og:image" content="http://x/cover.jpg">"#,
        );

        let info = source().parse("abc-123", html).unwrap();
        assert_eq!(info.avid, "ABC-123");
        assert_eq!(info.title, "Sample Title");
        assert_eq!(info.source, "avtoday");
        assert_eq!(info.image_url.as_deref(), Some("http://x/cover.jpg"));
    }

    #[test]
    fn parse_span_fallback_title() {
        let html = concat!(
            "<span>标题:</span> <span>后备标题</span>",
            r#"<meta property="og:image" content="http://x/cover.jpg">"#,
        );

        let info = source().parse("ABC-123", html).unwrap();
        assert_eq!(info.title, "后备标题");
    }

    #[test]
    fn parse_fails_without_title() {
        let html = r#"<meta property="og:image" content="http://x/cover.jpg">"#;
        assert!(source().parse("ABC-123", html).is_none());
    }

    #[test]
    fn parse_fails_without_image() {
        let html = r#"<meta property="og:title" content="Sample Title">"#;
        assert!(source().parse("ABC-123", html).is_none());
    }
}
