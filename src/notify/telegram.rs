use anyhow::{bail, Context, Result};
use html_escape::{encode_double_quoted_attribute, encode_text};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{byline, detail_lines, post_json_with_retries, Notifier};
use crate::ingest::types::Posting;

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct TelegramNotifier {
    bot_token: String,
    chat_id: String,
    api_base: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            bot_token,
            chat_id,
            api_base: TELEGRAM_API.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
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

    /// Point at a Bot API compatible server other than api.telegram.org.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// HTML-mode message body (Telegram supports b/i/a/code only).
pub fn render_message(posting: &Posting, reason: &str) -> String {
    let mut text = format!("<b>{}</b>\n", encode_text(&posting.title));
    let by = byline(posting);
    if !by.is_empty() {
        text.push_str(&format!("{}\n", encode_text(&by)));
    }
    for (label, value) in detail_lines(posting) {
        text.push_str(&format!("{label}: {}\n", encode_text(value)));
    }
    text.push_str(&format!("<i>Why:</i> {}\n", encode_text(reason)));
    if !posting.link.is_empty() {
        text.push_str(&format!(
            "<a href=\"{}\">Open posting</a> · ",
            encode_double_quoted_attribute(&posting.link)
        ));
    }
    text.push_str(&encode_text(&posting.source));
    text
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, posting: &Posting, reason: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: render_message(posting, reason),
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let rsp = post_json_with_retries(
            &self.client,
            &url,
            &body,
            self.timeout,
            self.max_retries,
            "telegram",
        )
        .await?;

        let reply: ApiReply = rsp.json().await.context("telegram reply body")?;
        if !reply.ok {
            bail!(
                "telegram rejected message: {}",
                reply.description.unwrap_or_default()
            );
        }
        Ok(())
    }

    fn channel(&self) -> &'static str {
        "telegram"
    }
}
