// src/ingest/providers/naukri.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::types::{Posting, SourceAdapter};
use crate::ingest::{normalize_opt, normalize_text, polite_delay, resolve_link};

const NAUKRI_BASE: &str = "https://www.naukri.com";

fn default_url() -> String {
    format!("{NAUKRI_BASE}/jobapi/v3/search")
}
fn default_job_age_days() -> u32 {
    1
}
fn default_results_per_page() -> u32 {
    20
}
fn default_pages() -> u32 {
    1
}

/// `kind = "naukri"` entry in the sources file.
#[derive(Debug, Clone, Deserialize)]
pub struct NaukriSpec {
    pub name: String,
    #[serde(default = "super::enabled_by_default")]
    pub enabled: bool,
    #[serde(default = "default_url")]
    pub url: String,
    pub keyword: String,
    pub location: String,
    /// Years of experience passed to the search ("0" = fresher).
    #[serde(default)]
    pub experience: u32,
    #[serde(default = "default_job_age_days")]
    pub job_age_days: u32,
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,
    #[serde(default = "default_pages")]
    pub pages: u32,
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    job_details: Vec<JobDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobDetail {
    #[serde(default)]
    title: String,
    #[serde(default)]
    company_name: String,
    #[serde(rename = "jdURL", default)]
    jd_url: String,
    #[serde(default)]
    job_description: String,
    #[serde(default)]
    placeholders: Vec<Placeholder>,
    #[serde(default)]
    footer_placeholder_label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Placeholder {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    label: String,
}

impl JobDetail {
    fn placeholder(&self, kind: &str) -> Option<&str> {
        self.placeholders
            .iter()
            .find(|p| p.kind.eq_ignore_ascii_case(kind))
            .map(|p| p.label.as_str())
    }
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        delay: Duration,
    },
}

/// Naukri job-search JSON API.
pub struct NaukriAdapter {
    spec: NaukriSpec,
    mode: Mode,
}

impl NaukriAdapter {
    pub fn from_spec(spec: NaukriSpec, client: reqwest::Client, delay: Duration) -> Self {
        Self {
            spec,
            mode: Mode::Http { client, delay },
        }
    }

    /// Parse `body` instead of calling the API (one page).
    pub fn from_fixture_str(spec: NaukriSpec, body: &str) -> Self {
        Self {
            spec,
            mode: Mode::Fixture(body.to_string()),
        }
    }

    fn parse_page(&self, body: &str) -> Result<Vec<Posting>> {
        let t0 = std::time::Instant::now();
        let rsp: SearchResponse =
            serde_json::from_str(body).context("parsing naukri search json")?;

        let mut out = Vec::with_capacity(rsp.job_details.len());
        for job in rsp.job_details {
            let title = normalize_text(&job.title);
            if title.is_empty() {
                continue;
            }
            let link = if job.jd_url.trim().is_empty() {
                String::new()
            } else {
                resolve_link(NAUKRI_BASE, &job.jd_url)
            };
            out.push(Posting {
                title,
                company: normalize_text(&job.company_name),
                location: job.placeholder("location").map(normalize_text).unwrap_or_default(),
                link,
                source: self.spec.name.clone(),
                description: normalize_text(&job.job_description),
                salary: normalize_opt(job.placeholder("salary")),
                experience: normalize_opt(job.placeholder("experience")),
                posted_date: normalize_opt(job.footer_placeholder_label.as_deref()),
            });
        }

        histogram!("adapter_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("postings_parsed_total").increment(out.len() as u64);
        Ok(out)
    }

    async fn fetch_page(&self, client: &reqwest::Client, page: u32) -> Result<String> {
        let s = &self.spec;
        let query = [
            ("noOfResults", s.results_per_page.to_string()),
            ("urlType", "search_by_keyloc".to_string()),
            ("searchType", "adv".to_string()),
            ("keyword", s.keyword.clone()),
            ("location", s.location.clone()),
            ("experience", s.experience.to_string()),
            ("jobAge", s.job_age_days.to_string()),
            ("pageNo", page.to_string()),
        ];
        let body = client
            .get(&s.url)
            .query(&query)
            .header("appid", "109")
            .header("systemid", "109")
            .send()
            .await
            .context("naukri http get()")?
            .error_for_status()
            .context("naukri non-2xx")?
            .text()
            .await
            .context("naukri http .text()")?;
        Ok(body)
    }
}

#[async_trait]
impl SourceAdapter for NaukriAdapter {
    async fn fetch(&self) -> Result<Vec<Posting>> {
        match &self.mode {
            Mode::Fixture(body) => self.parse_page(body),
            Mode::Http { client, delay } => {
                let mut all = Vec::new();
                for page in 0..self.spec.pages.max(1) {
                    polite_delay(&self.spec.name, *delay).await;
                    let fetched = self
                        .fetch_page(client, page)
                        .await
                        .and_then(|body| self.parse_page(&body));
                    let mut items = match fetched {
                        Ok(items) => items,
                        // keep what earlier pages produced
                        Err(e) if page > 0 => {
                            tracing::warn!(error = ?e, source = %self.spec.name, page, "stopping pagination");
                            break;
                        }
                        Err(e) => return Err(e),
                    };
                    let last_page = items.len() < self.spec.results_per_page as usize;
                    all.append(&mut items);
                    if last_page {
                        break;
                    }
                }
                Ok(all)
            }
        }
    }

    fn name(&self) -> &str {
        &self.spec.name
    }
}
