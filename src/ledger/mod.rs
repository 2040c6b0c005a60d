pub mod jsonl;
pub mod markdown;

pub use jsonl::JsonlLedger;
pub use markdown::MarkdownLedger;

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;

use crate::config::LedgerFormat;
use crate::models::LedgerEntry;

/// Label of the link line that closes every Markdown entry
pub const LINK_LABEL: &str = "[View GitHub Issue]";

/// Trait for append-only records of processed issues, keyed by issue URL
pub trait Ledger: Send + Sync {
    /// URLs of every issue already recorded; empty when the file is absent
    fn known_urls(&self) -> Result<HashSet<String>>;

    /// Append entries whose URL is not yet recorded, returning how many were written
    fn append(&self, entries: &[LedgerEntry]) -> Result<usize>;

    /// Whole ledger as Markdown, or `None` when nothing has been written yet
    fn render(&self) -> Result<Option<String>>;

    /// Location of the backing file
    fn path(&self) -> &Path;
}

impl<T: Ledger + ?Sized> Ledger for Box<T> {
    fn known_urls(&self) -> Result<HashSet<String>> {
        (**self).known_urls()
    }

    fn append(&self, entries: &[LedgerEntry]) -> Result<usize> {
        (**self).append(entries)
    }

    fn render(&self) -> Result<Option<String>> {
        (**self).render()
    }

    fn path(&self) -> &Path {
        (**self).path()
    }
}

/// Open the ledger at `path` in the configured format
pub fn open(format: LedgerFormat, path: &Path) -> Box<dyn Ledger> {
    match format {
        LedgerFormat::Markdown => Box::new(MarkdownLedger::new(path)),
        LedgerFormat::Jsonl => Box::new(JsonlLedger::new(path)),
    }
}

/// Format one entry as a Markdown block
pub fn format_entry(entry: &LedgerEntry) -> String {
    format!(
        "### 🔧 {}\n\n{}\n\n{}({})\n\n\n",
        entry.title, entry.summary, LINK_LABEL, entry.url
    )
}

/// Entries not in `known`, with in-batch duplicates dropped
pub(crate) fn unseen<'a>(
    entries: &'a [LedgerEntry],
    known: &HashSet<String>,
) -> Vec<&'a LedgerEntry> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|e| !known.contains(&e.url) && seen.insert(e.url.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str) -> LedgerEntry {
        LedgerEntry {
            title: "Crash".to_string(),
            summary: "Problem: x".to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_format_entry() {
        let block = format_entry(&entry("https://github.com/o/r/issues/1"));
        assert_eq!(
            block,
            "### 🔧 Crash\n\nProblem: x\n\n[View GitHub Issue](https://github.com/o/r/issues/1)\n\n\n"
        );
    }

    #[test]
    fn test_unseen_drops_known_and_duplicates() {
        let known: HashSet<String> = ["a".to_string()].into_iter().collect();
        let entries = vec![entry("a"), entry("b"), entry("b"), entry("c")];

        let urls: Vec<&str> = unseen(&entries, &known)
            .into_iter()
            .map(|e| e.url.as_str())
            .collect();
        assert_eq!(urls, vec!["b", "c"]);
    }
}
