// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use crate::ingest::config::{SourceSpec, SourcesConfig};
use crate::ingest::providers::{
    html_board::HtmlBoardAdapter, naukri::NaukriAdapter, portals::PortalListAdapter,
    rss_feed::RssFeedAdapter,
};
use crate::ingest::types::SourceAdapter;
use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Normalize text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (incl. nbsp and control separators)
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"[\s\u{00A0}\x1f]+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 4000 chars (descriptions can be whole JDs)
    if out.chars().count() > 4000 {
        out = out.chars().take(4000).collect();
    }

    out
}

/// Normalize an optional field; empty results collapse to `None`.
pub fn normalize_opt(s: Option<&str>) -> Option<String> {
    s.map(normalize_text).filter(|t| !t.is_empty())
}

/// Resolve a possibly relative `href` against the page it came from.
pub fn resolve_link(base: &str, href: &str) -> String {
    let href = href.trim();
    match reqwest::Url::parse(base).and_then(|b| b.join(href)) {
        Ok(u) => u.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Shared HTTP client for all adapters of one run.
pub fn http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .context("building http client")
}

/// Courtesy pause before a request to a third-party site.
pub(crate) async fn polite_delay(source: &str, delay: Duration) {
    if delay.is_zero() {
        return;
    }
    tracing::debug!(source, delay_ms = delay.as_millis() as u64, "rate-limit pause");
    tokio::time::sleep(delay).await;
}

/// Instantiate one adapter per enabled source entry, in file order.
pub fn build_adapters(
    cfg: &SourcesConfig,
    client: &reqwest::Client,
) -> Result<Vec<Box<dyn SourceAdapter>>> {
    let mut out: Vec<Box<dyn SourceAdapter>> = Vec::new();
    for spec in cfg.sources.iter().filter(|s| s.enabled()) {
        let delay = Duration::from_millis(spec.delay_ms().unwrap_or(cfg.defaults.delay_ms));
        let adapter: Box<dyn SourceAdapter> = match spec {
            SourceSpec::Naukri(s) => Box::new(NaukriAdapter::from_spec(s.clone(), client.clone(), delay)),
            SourceSpec::Html(s) => Box::new(
                HtmlBoardAdapter::from_spec(s.clone(), client.clone(), delay)
                    .with_context(|| format!("source {:?}", s.name))?,
            ),
            SourceSpec::Rss(s) => Box::new(RssFeedAdapter::from_spec(s.clone(), client.clone(), delay)),
            SourceSpec::Portals(s) => Box::new(PortalListAdapter::from_spec(s.clone())),
        };
        out.push(adapter);
    }
    tracing::info!(
        enabled = out.len(),
        configured = cfg.sources.len(),
        "source adapters ready"
    );
    Ok(out)
}
