// src/ingest/providers/html_board.rs
//! Generic HTML listing page. Every site-specific detail (which element is a
//! card, where the title lives) comes from the `selectors` table of the
//! source entry, so markup changes are fixed in config, not in code.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::types::{Posting, SourceAdapter};
use crate::ingest::{normalize_text, polite_delay, resolve_link};

#[derive(Debug, Clone, Deserialize)]
pub struct HtmlSelectors {
    /// One match per posting; the other selectors are evaluated inside it.
    pub card: String,
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Element carrying `href`; defaults to the first `a[href]` in the card.
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub posted: Option<String>,
}

/// `kind = "html"` entry in the sources file.
#[derive(Debug, Clone, Deserialize)]
pub struct HtmlBoardSpec {
    pub name: String,
    #[serde(default = "super::enabled_by_default")]
    pub enabled: bool,
    pub url: String,
    pub selectors: HtmlSelectors,
    /// Used when the card has no location element.
    #[serde(default)]
    pub default_location: Option<String>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

struct Compiled {
    card: Selector,
    title: Selector,
    company: Option<Selector>,
    location: Option<Selector>,
    link: Selector,
    description: Option<Selector>,
    salary: Option<Selector>,
    experience: Option<Selector>,
    posted: Option<Selector>,
}

fn compile(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| anyhow!("invalid css selector {s:?}: {e}"))
}

fn compile_opt(s: &Option<String>) -> Result<Option<Selector>> {
    s.as_deref().map(compile).transpose()
}

impl Compiled {
    fn new(sel: &HtmlSelectors) -> Result<Self> {
        Ok(Self {
            card: compile(&sel.card)?,
            title: compile(&sel.title)?,
            company: compile_opt(&sel.company)?,
            location: compile_opt(&sel.location)?,
            link: compile(sel.link.as_deref().unwrap_or("a[href]"))?,
            description: compile_opt(&sel.description)?,
            salary: compile_opt(&sel.salary)?,
            experience: compile_opt(&sel.experience)?,
            posted: compile_opt(&sel.posted)?,
        })
    }
}

fn text_of(card: &ElementRef<'_>, sel: &Selector) -> Option<String> {
    card.select(sel)
        .next()
        .map(|el| normalize_text(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|t| !t.is_empty())
}

fn opt_text(card: &ElementRef<'_>, sel: &Option<Selector>) -> Option<String> {
    sel.as_ref().and_then(|s| text_of(card, s))
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        delay: Duration,
    },
}

pub struct HtmlBoardAdapter {
    spec: HtmlBoardSpec,
    mode: Mode,
}

impl HtmlBoardAdapter {
    /// Fails early when a configured selector does not compile.
    pub fn from_spec(spec: HtmlBoardSpec, client: reqwest::Client, delay: Duration) -> Result<Self> {
        Compiled::new(&spec.selectors)?;
        Ok(Self {
            spec,
            mode: Mode::Http { client, delay },
        })
    }

    pub fn from_fixture_str(spec: HtmlBoardSpec, html: &str) -> Result<Self> {
        Compiled::new(&spec.selectors)?;
        Ok(Self {
            spec,
            mode: Mode::Fixture(html.to_string()),
        })
    }

    // `Html` is !Send, so parsing stays in a plain fn with no await points.
    fn parse_document(&self, html: &str) -> Result<Vec<Posting>> {
        let t0 = std::time::Instant::now();
        let sel = Compiled::new(&self.spec.selectors)?;
        let doc = Html::parse_document(html);

        let mut out = Vec::new();
        for card in doc.select(&sel.card) {
            let Some(title) = text_of(&card, &sel.title) else {
                continue;
            };
            let link = card
                .select(&sel.link)
                .next()
                .or_else(|| card.value().attr("href").map(|_| card))
                .and_then(|el| el.value().attr("href"))
                .map(|href| resolve_link(&self.spec.url, href))
                .unwrap_or_default();

            out.push(Posting {
                title,
                company: opt_text(&card, &sel.company).unwrap_or_default(),
                location: opt_text(&card, &sel.location)
                    .or_else(|| self.spec.default_location.clone())
                    .unwrap_or_default(),
                link,
                source: self.spec.name.clone(),
                description: opt_text(&card, &sel.description).unwrap_or_default(),
                salary: opt_text(&card, &sel.salary),
                experience: opt_text(&card, &sel.experience),
                posted_date: opt_text(&card, &sel.posted),
            });
        }

        histogram!("adapter_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("postings_parsed_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for HtmlBoardAdapter {
    async fn fetch(&self) -> Result<Vec<Posting>> {
        match &self.mode {
            Mode::Fixture(html) => self.parse_document(html),
            Mode::Http { client, delay } => {
                polite_delay(&self.spec.name, *delay).await;
                let body = client
                    .get(&self.spec.url)
                    .send()
                    .await
                    .context("html board http get()")?
                    .error_for_status()
                    .context("html board non-2xx")?
                    .text()
                    .await
                    .context("html board http .text()")?;
                self.parse_document(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.spec.name
    }
}
