use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::{format_entry, unseen, Ledger, LINK_LABEL};
use crate::models::LedgerEntry;

/// Markdown troubleshooting guide used as the ledger
pub struct MarkdownLedger {
    path: PathBuf,
}

impl MarkdownLedger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Ledger for MarkdownLedger {
    fn known_urls(&self) -> Result<HashSet<String>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Ledger not found, starting empty");
            return Ok(HashSet::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read ledger: {}", self.path.display()))?;

        Ok(parse_known_urls(&content))
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

        for entry in &new_entries {
            file.write_all(format_entry(entry).as_bytes())
                .with_context(|| format!("Failed to write ledger: {}", self.path.display()))?;
        }

        info!(count = new_entries.len(), path = %self.path.display(), "Appended ledger entries");

        Ok(new_entries.len())
    }

    fn render(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read ledger: {}", self.path.display()))?;

        Ok(Some(content))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Extract the trailing URL of every line that starts with the link label
fn parse_known_urls(content: &str) -> HashSet<String> {
    content
        .lines()
        .filter(|line| line.starts_with(LINK_LABEL))
        .filter_map(|line| {
            let (_, url) = line.trim_end().rsplit_once('(')?;
            let url = url.trim_end_matches(')');
            (!url.is_empty()).then(|| url.to_string())
        })
        .collect()
}
