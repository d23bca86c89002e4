//! Jable content source.
//!
//! Jable serves the canonical video page under a lower-cased path and keeps
//! an older upper-cased mirror path alive, so the fetch tries both.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use avmeta_db::models::AvInfo;
use avmeta_db::pool::DbPool;

use crate::config::HttpConfig;
use crate::extract::first_capture;

use super::{SiteClient, Source};

/// Title extraction patterns, tried in order. The `<title>` tag carries the
/// avid plus title suffixed with the site name.
const TITLE_PATTERNS: &[&str] = &[
    r"<title>(.+?)\s*-\s*Jable\.TV",
    r#"<h4 class="title">([^<]+)</h4>"#,
    r#"<span>标题:</span>\s*<span class="font-medium">([^<]+)</span>"#,
];

/// Cover URL extraction patterns.
const IMAGE_PATTERNS: &[&str] = &[r#"<meta property="og:image" content="([^"]+)""#];

/// Source for `jable.tv` video pages.
pub struct Jable {
    site: SiteClient,
}

impl Jable {
    pub const DOMAIN: &'static str = "jable.tv";

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
        vec![
            format!("{}/videos/{}/", self.site.base_url(), avid.to_lowercase()),
            format!("{}/video/{}", self.site.base_url(), avid),
        ]
    }
}

#[async_trait]
impl Source for Jable {
    fn name(&self) -> &'static str {
        "jable"
    }

    async fn fetch_page(&self, avid: &str) -> Option<String> {
        let avid = avid.to_uppercase();
        // The site rejects deep links without an on-site referer.
        let referer = format!("{}/", self.site.base_url());
        let urls = self.page_urls(&avid);
        let html = self
            .site
            .fetch_page_with_session(self.name(), &urls, Some(&referer))
            .await?;
        debug!(avid = %avid, "Fetched jable page");
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

    fn source() -> Jable {
        Jable::new(init_memory_pool().unwrap(), &HttpConfig::default(), None).unwrap()
    }

    #[test]
    fn page_urls_try_lowercase_path_first() {
        let source = source();
        let urls = source.page_urls("ABC-123");
        assert_eq!(urls[0], "https://jable.tv/videos/abc-123/");
        assert_eq!(urls[1], "https://jable.tv/video/ABC-123");
    }

    #[test]
    fn parse_title_tag() {
        let html = concat!(
            "<title>ABC-123 出色的样本标题 - Jable.TV | 免費</title>",
            r#"<meta property="og:image" content="https://cdn/covers/abc-123.jpg">"#,
        );

        let info = source().parse("ABC-123", html).unwrap();
        assert_eq!(info.title, "ABC-123 出色的样本标题");
        assert_eq!(info.source, "jable");
        assert_eq!(
            info.image_url.as_deref(),
            Some("https://cdn/covers/abc-123.jpg")
        );
    }

    #[test]
    fn parse_h4_fallback() {
        let html = concat!(
            r#"<h4 class="title">后备标题</h4>"#,
            r#"<meta property="og:image" content="https://cdn/c.jpg">"#,
        );

        let info = source().parse("ABC-123", html).unwrap();
        assert_eq!(info.title, "后备标题");
    }

    #[test]
    fn parse_requires_both_fields() {
        assert!(source()
            .parse("ABC-123", "<title>ABC-123 标题 - Jable.TV</title>")
            .is_none());
        assert!(source()
            .parse(
                "ABC-123",
                r#"<meta property="og:image" content="https://cdn/c.jpg">"#
            )
            .is_none());
    }
}
