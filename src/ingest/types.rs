// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One job listing as observed from one source during one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Posting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub link: String,
    pub source: String, // e.g. "Naukri Bangalore", "Daily portals"
    pub description: String,
    pub salary: Option<String>,     // raw text, parsed lazily by `extract`
    pub experience: Option<String>, // raw text, e.g. "0-2 Yrs"
    pub posted_date: Option<String>,
}

impl Posting {
    /// Stable deduplication key, see [`PostingId::derive`].
    pub fn id(&self) -> PostingId {
        PostingId::derive(&self.title, &self.company, &self.source)
    }
}

/// Hex digest derived from (title, company, source).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingId(String);

impl PostingId {
    pub fn derive(title: &str, company: &str, source: &str) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        for (i, part) in [title, company, source].iter().enumerate() {
            if i > 0 {
                // unit separator: never survives text normalization
                hasher.update([0x1f]);
            }
            hasher.update(part.trim().to_lowercase().as_bytes());
        }
        let digest = hasher.finalize();
        let mut out = String::with_capacity(32);
        for b in digest.iter().take(16) {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "{:02x}", b);
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PostingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for PostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch the current postings. `Ok(vec![])` means "nothing listed".
    async fn fetch(&self) -> Result<Vec<Posting>>;
    fn name(&self) -> &str;
    /// Hand-picked sources skip the candidate filter.
    fn curated(&self) -> bool {
        false
    }
}
