//! Shared outbound HTTP client construction.
//!
//! Every source and scraper talks to consumer sites that reject obvious
//! non-browser clients, so all clients carry the same browser-impersonation
//! headers. A single optional proxy URL from the configuration applies
//! uniformly to every client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};

/// User-Agent presented to all external sites.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Build an HTTP client with browser-impersonation defaults.
///
/// `proxy` is the single outbound proxy URL from the configuration; absence
/// means a direct connection. `timeout` applies per request.
pub fn build_client(proxy: Option<&str>, timeout: Duration) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
    );

    let mut builder = reqwest::Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .timeout(timeout);

    if let Some(proxy) = proxy {
        let proxy = reqwest::Proxy::all(proxy)
            .with_context(|| format!("Invalid proxy URL: {}", proxy))?;
        builder = builder.proxy(proxy);
    }

    builder.build().context("Failed to build HTTP client")
}
