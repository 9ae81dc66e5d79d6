// tests/notify_delivery.rs
use chrono::NaiveDate;
use job_alert_notifier::notify::deliver;
use job_alert_notifier::notify::discord::DiscordNotifier;
use job_alert_notifier::notify::telegram::{render_message, TelegramNotifier};
use job_alert_notifier::{Criteria, Orchestrator, Posting, RunOptions, SeenLedger, SourceAdapter};
use std::time::Duration;

fn posting() -> Posting {
    Posting {
        title: "Junior Data Analyst <Python>".into(),
        company: "Initech & Co".into(),
        location: "Chennai".into(),
        link: "https://jobs.example.test/initech".into(),
        source: "Board".into(),
        salary: Some("4,20,000 per year".into()),
        ..Default::default()
    }
}

// Nothing listens on the discard port; every attempt fails fast.
fn unreachable_telegram() -> TelegramNotifier {
    TelegramNotifier::new("123:abc".into(), "42".into())
        .with_api_base("http://127.0.0.1:9")
        .with_retries(1)
        .with_timeout(Duration::from_millis(500))
}

#[test]
fn telegram_message_escapes_markup() {
    let text = render_message(&posting(), "2 primary keywords (Python, SQL)");
    assert!(text.contains("Junior Data Analyst &lt;Python&gt;"));
    assert!(text.contains("Initech &amp; Co"));
    assert!(text.contains("4,20,000 per year"));
    assert!(text.contains("https://jobs.example.test/initech"));
}

#[tokio::test]
async fn unreachable_telegram_reports_failure() {
    assert!(!deliver(&unreachable_telegram(), &posting(), "target company (Initech)").await);
}

#[tokio::test]
async fn unreachable_discord_reports_failure() {
    let discord = DiscordNotifier::new("http://127.0.0.1:9/api/webhooks/1/x".into())
        .with_retries(1)
        .with_timeout(Duration::from_millis(500));
    assert!(!deliver(&discord, &posting(), "curated portal").await);
}

struct OnePosting;

#[async_trait::async_trait]
impl SourceAdapter for OnePosting {
    async fn fetch(&self) -> anyhow::Result<Vec<Posting>> {
        Ok(vec![posting()])
    }
    fn name(&self) -> &str {
        "Board"
    }
    fn curated(&self) -> bool {
        true
    }
}

#[tokio::test]
async fn failed_delivery_leaves_ledger_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("seen.json");
    let today = NaiveDate::from_ymd_opt(2025, 10, 14).unwrap();

    let orchestrator = Orchestrator::new(
        Criteria::default_seed(),
        vec![Box::new(OnePosting)],
        Box::new(unreachable_telegram()),
        RunOptions {
            notify_delay: Duration::ZERO,
            today: Some(today),
        },
    );
    let report = orchestrator.run_with_state(&state, None).await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.notified, 0);
    assert!(report.persisted);

    let ledger = SeenLedger::load(&state, today).await;
    assert!(ledger.is_empty());
    assert!(!ledger.contains(&posting().id()));
}
