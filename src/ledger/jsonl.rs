use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{format_entry, unseen, Ledger};
use crate::models::LedgerEntry;

/// Structured ledger: one JSON record per line
pub struct JsonlLedger {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct LedgerRecord {
    #[serde(flatten)]
    entry: LedgerEntry,
    recorded_at: DateTime<Utc>,
}

impl JsonlLedger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load_records(&self) -> Result<Vec<LedgerRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read ledger: {}", self.path.display()))?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).with_context(|| {
                    format!("Failed to parse ledger record at line {}", idx + 1)
                })
            })
            .collect()
    }
}

impl Ledger for JsonlLedger {
    fn known_urls(&self) -> Result<HashSet<String>> {
        let records = self.load_records()?;
        debug!(count = records.len(), "Loaded ledger records");
        Ok(records.into_iter().map(|r| r.entry.url).collect())
    }

    fn append(&self, entries: &[LedgerEntry]) -> Result<usize> {
        let known = self.known_urls()?;
        let new_entries = unseen(entries, &known);

        if new_entries.is_empty() {
            info!("No new issues to append");
            println!("🟢 No new issues to add.");
            return Ok(0);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open ledger: {}", self.path.display()))?;

        let recorded_at = Utc::now();
        for entry in &new_entries {
            let record = LedgerRecord {
                entry: (*entry).clone(),
                recorded_at,
            };
            let mut line = serde_json::to_string(&record)?;
            line.push('\n');
            file.write_all(line.as_bytes())
                .with_context(|| format!("Failed to write ledger: {}", self.path.display()))?;
        }

        info!(count = new_entries.len(), path = %self.path.display(), "Appended ledger records");

        Ok(new_entries.len())
    }

    fn render(&self) -> Result<Option<String>> {
        let records = self.load_records()?;
        if records.is_empty() {
            return Ok(None);
        }

        let markdown: String = records
            .iter()
            .map(|r| format_entry(&r.entry))
            .collect();

        Ok(Some(markdown))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
