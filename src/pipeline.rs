use std::collections::HashSet;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::adapters::TextGenerator;
use crate::github::GitHubClient;
use crate::ledger::Ledger;
use crate::models::{IssueState, LedgerEntry, RunReport, SummaryKind};
use crate::publisher::{strip_list_markers, Publisher};
use crate::summarizer::{issue_body, issue_text, Summarizer};

/// Incremental ingestion: fetch issues, summarize the unseen ones, append them
pub struct Pipeline<G: TextGenerator, L: Ledger> {
    github: GitHubClient,
    summarizer: Summarizer<G>,
    ledger: L,
}

impl<G: TextGenerator, L: Ledger> Pipeline<G, L> {
    pub fn new(github: GitHubClient, summarizer: Summarizer<G>, ledger: L) -> Self {
        Self {
            github,
            summarizer,
            ledger,
        }
    }

    /// Run one ingestion pass for `owner/repo`
    pub async fn run(
        &self,
        owner: &str,
        repo: &str,
        state: IssueState,
        kind: SummaryKind,
    ) -> Result<RunReport> {
        info!(owner, repo, state = state.as_str(), ?kind, "Starting ingestion");

        let known = self.ledger.known_urls()?;
        println!("📥 Collected {} known issue URLs from the ledger", known.len());

        let issues = self
            .github
            .list_issues(owner, repo, state)
            .await
            .with_context(|| format!("Failed to fetch {} issues", state.as_str()))?;
        println!("📦 Fetched {} {} issues", issues.len(), state.as_str());

        let mut report = RunReport {
            fetched: issues.len(),
            ..Default::default()
        };
        let mut entries = Vec::new();
        let mut queued = HashSet::new();

        for issue in &issues {
            if known.contains(&issue.html_url) || !queued.insert(issue.html_url.as_str()) {
                report.skipped += 1;
                continue;
            }

            debug!(number = issue.number, "Summarizing issue");

            let text = match kind {
                SummaryKind::Troubleshooting => {
                    let comments = self
                        .github
                        .list_comments(owner, repo, issue.number)
                        .await
                        .with_context(|| {
                            format!("Failed to fetch comments for issue #{}", issue.number)
                        })?;
                    issue_text(issue, &comments)
                }
                SummaryKind::FeatureRequest => issue_body(issue),
            };

            let summary = self.summarizer.summarize(kind, &text).await;

            entries.push(LedgerEntry {
                title: issue.title.clone(),
                summary,
                url: issue.html_url.clone(),
            });
        }

        report.appended = self.ledger.append(&entries)?;

        if report.appended > 0 {
            println!(
                "✅ Added {} issues to {}",
                report.appended,
                self.ledger.path().display()
            );
        }

        info!(
            fetched = report.fetched,
            skipped = report.skipped,
            appended = report.appended,
            "Ingestion complete"
        );

        Ok(report)
    }

    /// Get the ledger for direct access
    pub fn ledger(&self) -> &L {
        &self.ledger
    }
}

/// Publish the whole ledger with list markers stripped.
///
/// The publisher is built only once the ledger is known to have content, so a
/// missing or empty ledger returns `false` even when no publisher is configured.
pub async fn publish_ledger<L, P, F>(ledger: &L, destination: &str, make_publisher: F) -> Result<bool>
where
    L: Ledger + ?Sized,
    P: Publisher,
    F: FnOnce() -> Result<P>,
{
    let Some(content) = ledger.render()? else {
        info!(path = %ledger.path().display(), "Ledger not found, nothing to publish");
        println!("❌ Ledger file not found: {}", ledger.path().display());
        return Ok(false);
    };

    if content.trim().is_empty() {
        info!(path = %ledger.path().display(), "Ledger is empty, nothing to publish");
        println!("🟢 Ledger is empty: {}", ledger.path().display());
        return Ok(false);
    }

    let publisher = make_publisher()?;
    let cleaned = strip_list_markers(&content);
    publisher
        .publish(destination, &cleaned)
        .await
        .context("Failed to publish ledger")?;

    println!("📤 Published {} to {}", ledger.path().display(), destination);

    Ok(true)
}
