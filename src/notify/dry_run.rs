use anyhow::Result;

use super::Notifier;
use crate::ingest::types::Posting;

/// Logs what would have been sent. Always succeeds, so a dry run also
/// fills the ledger exactly as a real run would.
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, posting: &Posting, reason: &str) -> Result<()> {
        tracing::info!(
            title = %posting.title,
            company = %posting.company,
            location = %posting.location,
            link = %posting.link,
            reason,
            "dry-run notification"
        );
        Ok(())
    }

    fn channel(&self) -> &'static str {
        "log"
    }
}
