// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod extract;
pub mod filter;
pub mod ingest;
pub mod ledger;
pub mod notify;
pub mod run;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::config::{Channel, Criteria, Settings};
pub use crate::filter::{matches, CandidateFilter, Verdict};
pub use crate::ingest::types::{Posting, PostingId, SourceAdapter};
pub use crate::ledger::SeenLedger;
pub use crate::notify::Notifier;
pub use crate::run::{Orchestrator, RunOptions, RunReport};

use anyhow::{Context, Result};

use crate::ingest::config::SourcesConfig;

/// Everything a run needs, built from [`Settings`]. Fails on any
/// configuration problem before a single request is made.
pub fn build_orchestrator(settings: &Settings) -> Result<Orchestrator> {
    let criteria = Criteria::load(&settings.criteria_path)?;
    let sources = SourcesConfig::load(&settings.sources_path)?;

    let user_agent = sources
        .defaults
        .user_agent
        .as_deref()
        .unwrap_or(ingest::DEFAULT_USER_AGENT);
    let client = ingest::http_client(user_agent, settings.http_timeout)?;
    let adapters = ingest::build_adapters(&sources, &client).context("building source adapters")?;

    let notifier = notify::from_channel(&settings.channel, settings.http_timeout);
    tracing::info!(
        channel = notifier.channel(),
        keywords = criteria.keywords.len(),
        locations = criteria.locations.len(),
        "configuration loaded"
    );

    Ok(Orchestrator::new(
        criteria,
        adapters,
        notifier,
        RunOptions {
            notify_delay: settings.notify_delay,
            today: None,
        },
    ))
}
