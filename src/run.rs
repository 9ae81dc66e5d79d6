// src/run.rs
//! One invocation: every adapter in order → dedup → filter → notify →
//! persist the ledger once. Failures are contained at the smallest unit
//! (one adapter, one posting) and end up in the [`RunReport`].

use chrono::NaiveDate;
use metrics::{counter, gauge, histogram};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::Criteria;
use crate::filter::{CandidateFilter, REASON_CURATED};
use crate::ingest::types::{PostingId, SourceAdapter};
use crate::ledger::SeenLedger;
use crate::notify::{deliver, Notifier};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Pause between two deliveries (chat APIs rate-limit bursts).
    pub notify_delay: Duration,
    /// Date stamped on ledger entries; defaults to the local date.
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AdapterFailure {
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub fetched: usize,
    /// Same id seen twice within this run (e.g. two sources list it).
    pub duplicates: usize,
    pub already_seen: usize,
    pub rejected: usize,
    pub notified: usize,
    pub failed: usize,
    pub adapter_errors: Vec<AdapterFailure>,
    pub persisted: bool,
}

pub struct Orchestrator {
    filter: CandidateFilter,
    adapters: Vec<Box<dyn SourceAdapter>>,
    notifier: Box<dyn Notifier>,
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(
        criteria: Criteria,
        adapters: Vec<Box<dyn SourceAdapter>>,
        notifier: Box<dyn Notifier>,
        options: RunOptions,
    ) -> Self {
        Self {
            filter: CandidateFilter::new(criteria),
            adapters,
            notifier,
            options,
        }
    }

    fn today(&self) -> NaiveDate {
        self.options
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Load the ledger at `state_path`, apply retention, run, persist.
    pub async fn run_with_state(&self, state_path: &Path, retention_days: Option<u32>) -> RunReport {
        let today = self.today();
        let mut ledger = SeenLedger::load(state_path, today).await;
        if let Some(days) = retention_days {
            let dropped = ledger.prune_older_than(today, days);
            if dropped > 0 {
                tracing::info!(dropped, days, "ledger entries expired");
            }
        }
        self.run(&mut ledger).await
    }

    pub async fn run(&self, ledger: &mut SeenLedger) -> RunReport {
        crate::telemetry::ensure_metrics_described();
        let today = self.today();
        let mut report = RunReport::default();
        let mut handled: HashSet<PostingId> = HashSet::new();
        let mut delivered_before = false;

        for adapter in &self.adapters {
            let t0 = Instant::now();
            let fetched = adapter.fetch().await;
            histogram!("adapter_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

            let postings = match fetched {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = ?e, source = adapter.name(), "source adapter failed");
                    counter!("adapter_errors_total").increment(1);
                    report.adapter_errors.push(AdapterFailure {
                        source: adapter.name().to_string(),
                        error: format!("{e:#}"),
                    });
                    continue;
                }
            };
            tracing::info!(source = adapter.name(), count = postings.len(), "fetched");
            counter!("postings_fetched_total").increment(postings.len() as u64);
            report.fetched += postings.len();

            for posting in postings {
                let id = posting.id();
                if !handled.insert(id.clone()) {
                    report.duplicates += 1;
                    continue;
                }
                if ledger.contains(&id) {
                    report.already_seen += 1;
                    continue;
                }

                let reason = if adapter.curated() {
                    REASON_CURATED.to_string()
                } else {
                    let verdict = self.filter.matches(&posting);
                    if !verdict.accepted {
                        tracing::debug!(posting_id = %id, title = %posting.title, reason = %verdict.reason, "rejected");
                        counter!("postings_rejected_total").increment(1);
                        report.rejected += 1;
                        continue;
                    }
                    verdict.reason
                };

                if delivered_before && !self.options.notify_delay.is_zero() {
                    tokio::time::sleep(self.options.notify_delay).await;
                }
                delivered_before = true;

                if deliver(self.notifier.as_ref(), &posting, &reason).await {
                    ledger.add(id, today);
                    counter!("notifications_sent_total").increment(1);
                    report.notified += 1;
                } else {
                    // not recorded: eligible again next run
                    counter!("notifications_failed_total").increment(1);
                    report.failed += 1;
                }
            }
        }

        match ledger.persist().await {
            Ok(()) => report.persisted = true,
            Err(e) => {
                tracing::error!(error = ?e, path = %ledger.path().display(), "could not persist ledger");
            }
        }
        gauge!("run_last_ts").set(chrono::Utc::now().timestamp() as f64);

        tracing::info!(
            fetched = report.fetched,
            duplicates = report.duplicates,
            already_seen = report.already_seen,
            rejected = report.rejected,
            notified = report.notified,
            failed = report.failed,
            adapter_errors = report.adapter_errors.len(),
            "run finished"
        );
        report
    }
}
