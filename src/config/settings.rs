// src/config/settings.rs
use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_NOTIFIER: &str = "JOB_ALERTS_NOTIFIER";
pub const ENV_TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const ENV_DISCORD_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";
pub const ENV_STATE_PATH: &str = "JOB_ALERTS_STATE_PATH";
pub const ENV_CRITERIA_PATH: &str = "JOB_CRITERIA_PATH";
pub const ENV_SOURCES_PATH: &str = "JOB_SOURCES_PATH";
pub const ENV_RETENTION_DAYS: &str = "JOB_ALERTS_RETENTION_DAYS";
pub const ENV_NOTIFY_DELAY_MS: &str = "JOB_ALERTS_NOTIFY_DELAY_MS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "JOB_ALERTS_HTTP_TIMEOUT_SECS";
pub const ENV_LOG_JSON: &str = "JOB_ALERTS_LOG_JSON";
pub const ENV_METRICS_TEXTFILE: &str = "METRICS_TEXTFILE";

pub const DEFAULT_STATE_PATH: &str = "state/seen_postings.json";
pub const DEFAULT_CRITERIA_PATH: &str = "config/criteria.toml";
pub const DEFAULT_SOURCES_PATH: &str = "config/sources.toml";

/// Where notifications go. Secrets live only here.
#[derive(Clone, PartialEq, Eq)]
pub enum Channel {
    Telegram { bot_token: String, chat_id: String },
    Discord { webhook_url: String },
    /// Dry run: log the message, touch nothing external.
    Log,
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Telegram { bot_token, chat_id } => f
                .debug_struct("Telegram")
                .field("bot_token_len", &bot_token.len())
                .field("chat_id", chat_id)
                .finish(),
            Channel::Discord { .. } => f.write_str("Discord { webhook_url: <redacted> }"),
            Channel::Log => f.write_str("Log"),
        }
    }
}

/// Process configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub channel: Channel,
    pub state_path: PathBuf,
    pub criteria_path: PathBuf,
    pub sources_path: PathBuf,
    pub retention_days: Option<u32>,
    pub notify_delay: Duration,
    pub http_timeout: Duration,
    pub metrics_textfile: Option<PathBuf>,
}

/// Whether `JOB_ALERTS_LOG_JSON` asks for JSON log lines. Read on its own,
/// before [`Settings`], so configuration errors are logged in that format too.
pub fn log_json_enabled<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENV_LOG_JSON).is_some_and(|v| {
        let v = v.trim();
        v == "1" || v.eq_ignore_ascii_case("true")
    })
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`Settings::from_env`] with an injectable variable source.
    /// Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |k: &str| get(k).ok_or_else(|| anyhow!("missing {k} env var"));

        let channel = match get(ENV_NOTIFIER)
            .unwrap_or_else(|| "telegram".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "telegram" => Channel::Telegram {
                bot_token: require(ENV_TELEGRAM_BOT_TOKEN)?,
                chat_id: require(ENV_TELEGRAM_CHAT_ID)?,
            },
            "discord" => Channel::Discord {
                webhook_url: require(ENV_DISCORD_WEBHOOK_URL)?,
            },
            "log" | "dry-run" => Channel::Log,
            other => bail!("unsupported {ENV_NOTIFIER}: {other}"),
        };

        let parse_num = |k: &str| -> Result<Option<u64>> {
            get(k)
                .map(|v| v.parse::<u64>().with_context(|| format!("{k} must be a non-negative integer")))
                .transpose()
        };

        let retention_days = parse_num(ENV_RETENTION_DAYS)?
            .map(|d| u32::try_from(d).map_err(|_| anyhow!("{ENV_RETENTION_DAYS} out of range")))
            .transpose()?;

        Ok(Self {
            channel,
            state_path: get(ENV_STATE_PATH)
                .unwrap_or_else(|| DEFAULT_STATE_PATH.to_string())
                .into(),
            criteria_path: get(ENV_CRITERIA_PATH)
                .unwrap_or_else(|| DEFAULT_CRITERIA_PATH.to_string())
                .into(),
            sources_path: get(ENV_SOURCES_PATH)
                .unwrap_or_else(|| DEFAULT_SOURCES_PATH.to_string())
                .into(),
            retention_days,
            notify_delay: Duration::from_millis(parse_num(ENV_NOTIFY_DELAY_MS)?.unwrap_or(1000)),
            http_timeout: Duration::from_secs(parse_num(ENV_HTTP_TIMEOUT_SECS)?.unwrap_or(30)),
            metrics_textfile: get(ENV_METRICS_TEXTFILE).map(PathBuf::from),
        })
    }
}
