// src/ledger.rs
//! Seen-set of postings already notified, persisted as JSON between runs.
//!
//! On disk it is a map `posting id → date last notified`. The older flat
//! array of ids is still accepted on load. Anything unreadable loads as an
//! empty ledger: a duplicate alert is better than a run that never sends.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ingest::types::PostingId;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OnDisk {
    Dated(BTreeMap<PostingId, NaiveDate>),
    Flat(Vec<PostingId>),
}

#[derive(Debug, Clone)]
pub struct SeenLedger {
    path: PathBuf,
    entries: BTreeMap<PostingId, NaiveDate>,
}

impl SeenLedger {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Read the ledger at `path`. Flat-array entries are dated `today`.
    /// Never fails; missing or corrupt files give an empty ledger.
    pub async fn load(path: impl Into<PathBuf>, today: NaiveDate) -> Self {
        let mut ledger = Self::empty(path);
        let raw = match fs::read_to_string(&ledger.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %ledger.path.display(), "no ledger yet, starting empty");
                return ledger;
            }
            Err(e) => {
                tracing::warn!(path = %ledger.path.display(), error = %e, "ledger unreadable, starting empty");
                return ledger;
            }
        };

        if raw.trim().is_empty() {
            return ledger;
        }

        match serde_json::from_str::<OnDisk>(&raw) {
            Ok(OnDisk::Dated(map)) => ledger.entries = map,
            Ok(OnDisk::Flat(ids)) => {
                ledger.entries = ids.into_iter().map(|id| (id, today)).collect();
            }
            Err(e) => {
                tracing::warn!(path = %ledger.path.display(), error = %e, "ledger corrupt, starting empty");
            }
        }
        tracing::debug!(entries = ledger.entries.len(), "ledger loaded");
        ledger
    }

    pub fn contains(&self, id: &PostingId) -> bool {
        self.entries.contains_key(id)
    }

    /// Record a confirmed delivery.
    pub fn add(&mut self, id: PostingId, notified_on: NaiveDate) {
        self.entries.insert(id, notified_on);
    }

    pub fn notified_on(&self, id: &PostingId) -> Option<NaiveDate> {
        self.entries.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forget entries notified `days` or more days before `today`.
    /// Returns how many were dropped.
    pub fn prune_older_than(&mut self, today: NaiveDate, days: u32) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, date| today.signed_duration_since(*date).num_days() < i64::from(days));
        before - self.entries.len()
    }

    /// Overwrite the backing file with the whole in-memory set.
    /// Writes a sibling temp file first and renames it into place.
    /// No locking: two processes persisting at once will lose one write.
    pub async fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let body = serde_json::to_vec_pretty(&self.entries).context("serializing ledger")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}
