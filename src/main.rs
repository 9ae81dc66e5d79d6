//! job-alerts: one polling run.
//! Loads `.env`, reads settings, fetches every enabled source, notifies new
//! matches and persists the seen-set. Scheduling is left to cron / CI.

use std::process::ExitCode;

use job_alert_notifier::telemetry::{init_tracing, Metrics};
use job_alert_notifier::config::settings::log_json_enabled;
use job_alert_notifier::{build_orchestrator, Settings};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    init_tracing(log_json_enabled(|k| std::env::var(k).ok()));

    // Missing credentials or broken config files stop here, before any request.
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "configuration error");
            return ExitCode::FAILURE;
        }
    };
    let orchestrator = match build_orchestrator(&settings) {
        Ok(o) => o,
        Err(e) => {
            tracing::error!(error = ?e, "configuration error");
            return ExitCode::FAILURE;
        }
    };

    let metrics = match settings.metrics_textfile {
        Some(_) => Metrics::init()
            .map_err(|e| tracing::warn!(error = ?e, "metrics disabled"))
            .ok(),
        None => None,
    };

    let report = orchestrator
        .run_with_state(&settings.state_path, settings.retention_days)
        .await;

    if let (Some(m), Some(path)) = (&metrics, &settings.metrics_textfile) {
        if let Err(e) = m.write_textfile(path).await {
            tracing::warn!(error = ?e, "metrics textfile not written");
        }
    }

    match serde_json::to_string(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "report not serializable"),
    }

    // Nothing new, failed sources or failed deliveries are all normal exits.
    ExitCode::SUCCESS
}
