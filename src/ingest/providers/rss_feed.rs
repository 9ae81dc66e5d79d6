use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, macros::format_description, OffsetDateTime, UtcOffset};

use crate::ingest::types::{Posting, SourceAdapter};
use crate::ingest::{normalize_opt, normalize_text, polite_delay};

/// `kind = "rss"` entry in the sources file.
#[derive(Debug, Clone, Deserialize)]
pub struct RssSpec {
    pub name: String,
    #[serde(default = "super::enabled_by_default")]
    pub enabled: bool,
    pub url: String,
    /// Location for items without a `<region>` element.
    #[serde(default)]
    pub default_location: Option<String>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    region: Option<String>,
}

/// RFC 2822 `pubDate` → `YYYY-MM-DD` (UTC); anything else is dropped.
fn pub_date_to_day(ts: &str) -> Option<String> {
    let dt = OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()?
        .to_offset(UtcOffset::UTC);
    dt.format(format_description!("[year]-[month]-[day]")).ok()
}

/// Feeds such as WeWorkRemotely title items `Company: Role`.
fn split_company_title(raw: &str) -> (String, String) {
    match raw.split_once(": ") {
        Some((company, title)) if !company.trim().is_empty() && !title.trim().is_empty() => {
            (company.trim().to_string(), title.trim().to_string())
        }
        _ => (String::new(), raw.trim().to_string()),
    }
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        delay: Duration,
    },
}

pub struct RssFeedAdapter {
    spec: RssSpec,
    mode: Mode,
}

impl RssFeedAdapter {
    pub fn from_spec(spec: RssSpec, client: reqwest::Client, delay: Duration) -> Self {
        Self {
            spec,
            mode: Mode::Http { client, delay },
        }
    }

    pub fn from_fixture_str(spec: RssSpec, xml: &str) -> Self {
        Self {
            spec,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<Posting>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let raw_title = normalize_text(it.title.as_deref().unwrap_or_default());
            let (company, title) = split_company_title(&raw_title);
            if title.is_empty() {
                continue;
            }
            out.push(Posting {
                title,
                company,
                location: normalize_opt(it.region.as_deref())
                    .or_else(|| self.spec.default_location.clone())
                    .unwrap_or_default(),
                link: it.link.map(|l| l.trim().to_string()).unwrap_or_default(),
                source: self.spec.name.clone(),
                description: normalize_text(it.description.as_deref().unwrap_or_default()),
                salary: None,
                experience: None,
                posted_date: it.pub_date.as_deref().and_then(pub_date_to_day),
            });
        }

        histogram!("adapter_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("postings_parsed_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for RssFeedAdapter {
    async fn fetch(&self) -> Result<Vec<Posting>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { client, delay } => {
                polite_delay(&self.spec.name, *delay).await;
                let body = client
                    .get(&self.spec.url)
                    .send()
                    .await
                    .context("rss http get()")?
                    .error_for_status()
                    .context("rss non-2xx")?
                    .text()
                    .await
                    .context("rss http .text()")?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.spec.name
    }
}

// quick-xml only knows the five XML entities
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&rupee;", "Rs ")
}
