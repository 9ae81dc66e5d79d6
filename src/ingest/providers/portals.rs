// src/ingest/providers/portals.rs
//! Static, hand-curated list of search pages ("check these today").
//! No network access; every entry becomes one posting that skips the
//! candidate filter.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::ingest::normalize_text;
use crate::ingest::types::{Posting, SourceAdapter};

#[derive(Debug, Clone, Deserialize)]
pub struct PortalEntry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
}

/// `kind = "portals"` entry in the sources file.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalsSpec {
    pub name: String,
    #[serde(default = "super::enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub portals: Vec<PortalEntry>,
}

pub struct PortalListAdapter {
    spec: PortalsSpec,
}

impl PortalListAdapter {
    pub fn from_spec(spec: PortalsSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl SourceAdapter for PortalListAdapter {
    async fn fetch(&self) -> Result<Vec<Posting>> {
        Ok(self
            .spec
            .portals
            .iter()
            .filter(|p| !p.name.trim().is_empty() && !p.url.trim().is_empty())
            .map(|p| Posting {
                title: normalize_text(&p.name),
                company: String::new(),
                location: normalize_text(&p.location),
                link: p.url.trim().to_string(),
                source: self.spec.name.clone(),
                description: normalize_text(&p.description),
                ..Default::default()
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.spec.name
    }

    fn curated(&self) -> bool {
        true
    }
}
