// tests/run_pipeline.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use job_alert_notifier::ingest::providers::portals::{PortalEntry, PortalListAdapter, PortalsSpec};
use job_alert_notifier::{
    Criteria, Notifier, Orchestrator, Posting, RunOptions, SeenLedger, SourceAdapter,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

struct FixedAdapter {
    name: &'static str,
    postings: Vec<Posting>,
}

#[async_trait]
impl SourceAdapter for FixedAdapter {
    async fn fetch(&self) -> Result<Vec<Posting>> {
        Ok(self.postings.clone())
    }
    fn name(&self) -> &str {
        self.name
    }
}

struct BrokenAdapter;

#[async_trait]
impl SourceAdapter for BrokenAdapter {
    async fn fetch(&self) -> Result<Vec<Posting>> {
        Err(anyhow!("connection reset by peer"))
    }
    fn name(&self) -> &str {
        "Broken source"
    }
}

/// Records every delivered title; can be switched to fail.
#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    down: Arc<AtomicBool>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, posting: &Posting, _reason: &str) -> Result<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(anyhow!("chat endpoint unreachable"));
        }
        self.sent.lock().unwrap().push(posting.title.clone());
        Ok(())
    }
    fn channel(&self) -> &'static str {
        "recording"
    }
}

fn posting(title: &str, company: &str, location: &str, description: &str) -> Posting {
    Posting {
        title: title.into(),
        company: company.into(),
        location: location.into(),
        description: description.into(),
        link: format!("https://jobs.example.test/{}", title.replace(' ', "-")),
        source: "Fixed".into(),
        ..Default::default()
    }
}

fn listing() -> Vec<Posting> {
    vec![
        posting("Data Analyst Fresher", "Acme", "Bangalore", "Python SQL Excel dashboard"),
        posting("Support Associate", "Amazon India", "Gurgaon", ""),
        posting("Data Analyst", "Acme", "Gurgaon", "Python SQL"),
    ]
}

fn options() -> RunOptions {
    RunOptions {
        notify_delay: std::time::Duration::ZERO,
        today: NaiveDate::from_ymd_opt(2025, 10, 14),
    }
}

fn orchestrator(adapters: Vec<Box<dyn SourceAdapter>>, notifier: &RecordingNotifier) -> Orchestrator {
    Orchestrator::new(
        Criteria::default_seed(),
        adapters,
        Box::new(notifier.clone()),
        options(),
    )
}

fn fixed() -> Box<dyn SourceAdapter> {
    Box::new(FixedAdapter {
        name: "Fixed",
        postings: listing(),
    })
}

async fn ledger_at(path: &Path) -> SeenLedger {
    SeenLedger::load(path, NaiveDate::from_ymd_opt(2025, 10, 14).unwrap()).await
}

#[tokio::test]
async fn second_run_without_new_postings_sends_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("seen.json");
    let notifier = RecordingNotifier::default();

    let first = orchestrator(vec![fixed()], &notifier)
        .run_with_state(&state, None)
        .await;
    assert_eq!(first.fetched, 3);
    assert_eq!(first.notified, 2);
    assert_eq!(first.rejected, 1);
    assert!(first.persisted);
    assert_eq!(
        notifier.sent(),
        vec!["Data Analyst Fresher".to_string(), "Support Associate".to_string()]
    );

    let second = orchestrator(vec![fixed()], &notifier)
        .run_with_state(&state, None)
        .await;
    assert_eq!(second.notified, 0);
    assert_eq!(second.already_seen, 2);
    assert_eq!(notifier.sent().len(), 2);
}

#[tokio::test]
async fn failed_delivery_is_not_recorded_and_retried_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("seen.json");
    let notifier = RecordingNotifier::default();
    notifier.down.store(true, Ordering::SeqCst);

    let first = orchestrator(vec![fixed()], &notifier)
        .run_with_state(&state, None)
        .await;
    assert_eq!(first.failed, 2);
    assert_eq!(first.notified, 0);
    assert!(first.persisted);
    assert!(ledger_at(&state).await.is_empty());

    notifier.down.store(false, Ordering::SeqCst);
    let second = orchestrator(vec![fixed()], &notifier)
        .run_with_state(&state, None)
        .await;
    assert_eq!(second.notified, 2);
    assert_eq!(ledger_at(&state).await.len(), 2);
}

#[tokio::test]
async fn broken_adapter_does_not_stop_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("seen.json");
    let notifier = RecordingNotifier::default();

    let report = orchestrator(vec![Box::new(BrokenAdapter), fixed()], &notifier)
        .run_with_state(&state, None)
        .await;
    assert_eq!(report.adapter_errors.len(), 1);
    assert_eq!(report.adapter_errors[0].source, "Broken source");
    assert!(report.adapter_errors[0].error.contains("connection reset"));
    assert_eq!(report.notified, 2);
}

#[tokio::test]
async fn corrupt_state_file_does_not_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("seen.json");
    std::fs::write(&state, "]]] definitely not json").unwrap();
    let notifier = RecordingNotifier::default();

    let report = orchestrator(vec![fixed()], &notifier)
        .run_with_state(&state, None)
        .await;
    assert_eq!(report.notified, 2);
    assert!(report.persisted);
    assert_eq!(ledger_at(&state).await.len(), 2);
}

#[tokio::test]
async fn same_posting_from_two_sources_in_one_run_is_sent_once() {
    let notifier = RecordingNotifier::default();
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = SeenLedger::empty(dir.path().join("seen.json"));

    let report = orchestrator(vec![fixed(), fixed()], &notifier)
        .run(&mut ledger)
        .await;
    assert_eq!(report.fetched, 6);
    assert_eq!(report.duplicates, 3);
    assert_eq!(report.notified, 2);
}

#[tokio::test]
async fn curated_portals_skip_the_filter_and_expire_with_retention() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("seen.json");
    let notifier = RecordingNotifier::default();
    let portals = || -> Box<dyn SourceAdapter> {
        Box::new(PortalListAdapter::from_spec(PortalsSpec {
            name: "Daily portals".into(),
            enabled: true,
            portals: vec![PortalEntry {
                // would fail the keyword filter on its own
                name: "Foundit".into(),
                url: "https://www.foundit.in/".into(),
                description: "Job board".into(),
                location: "Delhi".into(),
            }],
        }))
    };

    let first = orchestrator(vec![portals()], &notifier)
        .run_with_state(&state, Some(1))
        .await;
    assert_eq!(first.notified, 1);

    // same day: still suppressed
    let again = orchestrator(vec![portals()], &notifier)
        .run_with_state(&state, Some(1))
        .await;
    assert_eq!(again.notified, 0);

    // next day with one-day retention: offered again
    let next_day = Orchestrator::new(
        Criteria::default_seed(),
        vec![portals()],
        Box::new(notifier.clone()),
        RunOptions {
            notify_delay: std::time::Duration::ZERO,
            today: NaiveDate::from_ymd_opt(2025, 10, 15),
        },
    )
    .run_with_state(&state, Some(1))
    .await;
    assert_eq!(next_day.notified, 1);
    assert_eq!(notifier.sent(), vec!["Foundit".to_string(), "Foundit".to_string()]);
}
