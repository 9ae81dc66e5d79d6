pub mod discord;
pub mod dry_run;
pub mod telegram;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::config::Channel;
use crate::ingest::types::Posting;

/// Delivers one accepted posting to a chat destination.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// `Ok` only once the endpoint confirmed the message.
    async fn send(&self, posting: &Posting, reason: &str) -> Result<()>;
    fn channel(&self) -> &'static str;
}

/// Send and swallow the error: a failed delivery only affects this posting.
pub async fn deliver(notifier: &dyn Notifier, posting: &Posting, reason: &str) -> bool {
    match notifier.send(posting, reason).await {
        Ok(()) => {
            tracing::info!(channel = notifier.channel(), title = %posting.title, source = %posting.source, "notified");
            true
        }
        Err(e) => {
            tracing::warn!(channel = notifier.channel(), title = %posting.title, error = ?e, "delivery failed");
            false
        }
    }
}

/// Build the notifier for the configured channel.
pub fn from_channel(channel: &Channel, timeout: Duration) -> Box<dyn Notifier> {
    match channel {
        Channel::Telegram { bot_token, chat_id } => Box::new(
            telegram::TelegramNotifier::new(bot_token.clone(), chat_id.clone()).with_timeout(timeout),
        ),
        Channel::Discord { webhook_url } => {
            Box::new(discord::DiscordNotifier::new(webhook_url.clone()).with_timeout(timeout))
        }
        Channel::Log => Box::new(dry_run::LogNotifier),
    }
}

/// Optional detail lines shared by every channel's layout.
pub(crate) fn detail_lines(posting: &Posting) -> Vec<(&'static str, &str)> {
    [
        ("Salary", posting.salary.as_deref()),
        ("Experience", posting.experience.as_deref()),
        ("Posted", posting.posted_date.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, v)| v.filter(|s| !s.is_empty()).map(|s| (label, s)))
    .collect()
}

/// "Company · Location", skipping empty parts.
pub(crate) fn byline(posting: &Posting) -> String {
    [posting.company.as_str(), posting.location.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" · ")
}

/// Pause before retry number `attempt` (1-based): 500ms doubling, capped at 32s.
fn backoff(attempt: u8) -> Duration {
    Duration::from_millis(500u64 << attempt.saturating_sub(1).min(6))
}

/// POST `payload` as JSON, retrying transport errors and non-2xx responses
/// with exponential backoff (500ms, 1s, 2s, ...).
pub(crate) async fn post_json_with_retries<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    payload: &T,
    timeout: Duration,
    max_retries: u8,
    label: &str,
) -> Result<reqwest::Response> {
    let max_retries = max_retries.max(1);
    let mut attempt: u8 = 0;
    loop {
        attempt += 1;
        let res = client.post(url).timeout(timeout).json(payload).send().await;

        match res {
            Ok(rsp) => {
                if let Err(e) = rsp.error_for_status_ref() {
                    if attempt < max_retries {
                        tokio::time::sleep(backoff(attempt)).await;
                        continue;
                    }
                    return Err(anyhow!("{label} HTTP error: {}", e.without_url()));
                }
                return Ok(rsp);
            }
            Err(e) => {
                if attempt < max_retries {
                    tokio::time::sleep(backoff(attempt)).await;
                    continue;
                }
                // without_url: the Telegram URL embeds the bot token
                return Err(anyhow!("{label} request failed: {}", e.without_url()));
            }
        }
    }
}
