use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{byline, detail_lines, post_json_with_retries, Notifier};
use crate::ingest::types::Posting;

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[derive(Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn for_posting(posting: &Posting, reason: &str) -> Self {
        let mut description = String::new();
        let by = byline(posting);
        if !by.is_empty() {
            description.push_str(&by);
            description.push('\n');
        }
        for (label, value) in detail_lines(posting) {
            description.push_str(&format!("**{label}:** {value}\n"));
        }
        description.push_str(&format!("**Why:** {reason}\n**Source:** {}", posting.source));

        Self {
            content: None,
            embeds: vec![DiscordEmbed {
                // embed limits: title 256, description 4096
                title: truncate(&posting.title, 256),
                description: truncate(&description, 4096),
                url: Some(posting.link.clone()).filter(|l| l.starts_with("http")),
            }],
        }
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, posting: &Posting, reason: &str) -> Result<()> {
        let payload = DiscordWebhookPayload::for_posting(posting, reason);
        post_json_with_retries(
            &self.client,
            &self.webhook,
            &payload,
            self.timeout,
            self.max_retries,
            "discord webhook",
        )
        .await?;
        Ok(())
    }

    fn channel(&self) -> &'static str {
        "discord"
    }
}
