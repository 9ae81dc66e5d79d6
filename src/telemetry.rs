use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::path::Path;

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("job_alert_notifier=info,job_alerts=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_target(false)).init();
    } else {
        registry.with(fmt::layer().compact().with_target(false)).init();
    }
}

/// One-time metric descriptions (so series carry HELP text).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("postings_parsed_total", "Postings parsed from source responses.");
        describe_counter!("postings_fetched_total", "Postings returned by adapters to the run.");
        describe_counter!("postings_rejected_total", "Postings rejected by the candidate filter.");
        describe_counter!("notifications_sent_total", "Notifications confirmed by the endpoint.");
        describe_counter!("notifications_failed_total", "Notifications that failed to deliver.");
        describe_counter!("adapter_errors_total", "Source adapters that returned an error.");
        describe_histogram!("adapter_parse_ms", "Response parse time in milliseconds.");
        describe_histogram!("adapter_fetch_ms", "Adapter fetch time (incl. delays) in milliseconds.");
        describe_gauge!("run_last_ts", "Unix ts when the last run finished.");
    });
}

/// Prometheus recorder for one batch run. There is no scrape endpoint;
/// the rendered text is written to a node-exporter style textfile at exit.
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    pub async fn write_textfile(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        tokio::fs::write(path, self.render())
            .await
            .with_context(|| format!("writing metrics to {}", path.display()))
    }
}
