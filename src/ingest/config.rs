// src/ingest/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::ingest::providers::{
    html_board::HtmlBoardSpec, naukri::NaukriSpec, portals::{PortalEntry, PortalsSpec},
    rss_feed::RssSpec,
};

fn default_delay_ms() -> u64 {
    1500
}

/// Contents of `config/sources.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SourcesConfig {
    #[serde(default)]
    pub defaults: FetchDefaults,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchDefaults {
    /// Pause before every outbound request unless a source overrides it.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for FetchDefaults {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
    Naukri(NaukriSpec),
    Html(HtmlBoardSpec),
    Rss(RssSpec),
    Portals(PortalsSpec),
}

impl SourceSpec {
    pub fn name(&self) -> &str {
        match self {
            SourceSpec::Naukri(s) => &s.name,
            SourceSpec::Html(s) => &s.name,
            SourceSpec::Rss(s) => &s.name,
            SourceSpec::Portals(s) => &s.name,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            SourceSpec::Naukri(s) => s.enabled,
            SourceSpec::Html(s) => s.enabled,
            SourceSpec::Rss(s) => s.enabled,
            SourceSpec::Portals(s) => s.enabled,
        }
    }

    pub fn delay_ms(&self) -> Option<u64> {
        match self {
            SourceSpec::Naukri(s) => s.delay_ms,
            SourceSpec::Html(s) => s.delay_ms,
            SourceSpec::Rss(s) => s.delay_ms,
            SourceSpec::Portals(_) => None,
        }
    }
}

impl SourcesConfig {
    /// Load from `path`. A missing file falls back to [`SourcesConfig::default_seed`];
    /// a file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no sources file, using built-in portal list");
            return Ok(Self::default_seed());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading sources from {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing sources in {}", path.display()))
    }

    pub fn parse(s: &str) -> Result<Self> {
        let cfg: SourcesConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    /// Built-in curated portal checklist, used when no sources file exists.
    pub fn default_seed() -> Self {
        let portals = [
            (
                "LinkedIn Bangalore",
                "https://www.linkedin.com/jobs/search/?keywords=data%20analyst%20fresher&location=bangalore&f_TPR=r86400",
                "Data Analyst fresher jobs in Bangalore (last 24h)",
                "Bangalore",
            ),
            (
                "LinkedIn Chennai",
                "https://www.linkedin.com/jobs/search/?keywords=data%20analyst%20fresher&location=chennai&f_TPR=r86400",
                "Data Analyst fresher jobs in Chennai (last 24h)",
                "Chennai",
            ),
            (
                "LinkedIn Hyderabad",
                "https://www.linkedin.com/jobs/search/?keywords=data%20analyst%20fresher&location=hyderabad&f_TPR=r86400",
                "Data Analyst fresher jobs in Hyderabad (last 24h)",
                "Hyderabad",
            ),
            (
                "Naukri Fresher Bangalore",
                "https://www.naukri.com/data-analyst-fresher-jobs-in-bangalore?k=data%20analyst%20fresher&l=bangalore",
                "Data Analyst fresher jobs on Naukri Bangalore",
                "Bangalore",
            ),
            (
                "Indeed Fresher India",
                "https://in.indeed.com/jobs?q=data+analyst+fresher&l=india&fromage=1",
                "Data Analyst fresher jobs across India (last 24h)",
                "India",
            ),
            (
                "Foundit Fresher",
                "https://www.foundit.in/data-analyst-fresher-jobs-in-india",
                "Data Analyst fresher jobs on Foundit",
                "India",
            ),
            (
                "Python Fresher Bangalore",
                "https://www.linkedin.com/jobs/search/?keywords=python%20fresher&location=bangalore&f_TPR=r86400",
                "Python fresher jobs in Bangalore",
                "Bangalore",
            ),
            (
                "SQL Fresher India",
                "https://www.linkedin.com/jobs/search/?keywords=sql%20fresher&location=india&f_TPR=r86400",
                "SQL fresher jobs across India",
                "India",
            ),
        ];
        let entries = portals
            .into_iter()
            .map(|(name, url, description, location)| PortalEntry {
                name: name.to_string(),
                url: url.to_string(),
                description: description.to_string(),
                location: location.to_string(),
            })
            .collect();

        Self {
            defaults: FetchDefaults::default(),
            sources: vec![SourceSpec::Portals(PortalsSpec {
                name: "Daily portals".to_string(),
                enabled: true,
                portals: entries,
            })],
        }
    }
}
