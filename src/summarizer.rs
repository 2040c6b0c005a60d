use tracing::{info, warn};

use crate::adapters::TextGenerator;
use crate::models::{Comment, Issue, SummaryKind};

/// Placeholder recorded when troubleshooting analysis fails
pub const TROUBLESHOOTING_FALLBACK: &str =
    "Problem: Analysis failed\nCause: Analysis failed\nSolution: Analysis failed";

/// Placeholder recorded when feature-request extraction fails
pub const FEATURE_REQUEST_FALLBACK: &str =
    "Request: Analysis failed\nMotivation: Analysis failed\nSuggested approach: Analysis failed";

impl SummaryKind {
    pub fn fallback(&self) -> &'static str {
        match self {
            SummaryKind::Troubleshooting => TROUBLESHOOTING_FALLBACK,
            SummaryKind::FeatureRequest => FEATURE_REQUEST_FALLBACK,
        }
    }
}

/// Condenses issue text through a text generator, never failing
pub struct Summarizer<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> Summarizer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Summarize `text`, substituting the kind's fallback on any provider error
    pub async fn summarize(&self, kind: SummaryKind, text: &str) -> String {
        let prompt = build_prompt(kind, text);

        match self.generator.generate(&prompt).await {
            Ok(summary) => {
                info!(?kind, "Summary generated");
                summary
            }
            Err(e) => {
                warn!(?kind, error = %e, "Summarization failed, recording placeholder");
                println!("❌ Analysis failed: {e:#}");
                kind.fallback().to_string()
            }
        }
    }
}

/// Issue body followed by its numbered comments
pub fn issue_text(issue: &Issue, comments: &[Comment]) -> String {
    let mut text = issue_body(issue);

    for (idx, comment) in comments.iter().enumerate() {
        let body = comment.body.as_deref().unwrap_or_default();
        text.push_str(&format!("\n**💬 Comment {}:**\n{}\n", idx + 1, body));
    }

    text
}

/// Trimmed issue body with doubled single quotes collapsed
pub fn issue_body(issue: &Issue) -> String {
    issue
        .body
        .as_deref()
        .unwrap_or_default()
        .trim()
        .replace("''", "'")
}

fn build_prompt(kind: SummaryKind, text: &str) -> String {
    match kind {
        SummaryKind::Troubleshooting => format!(
            r#"Below is a GitHub issue and its discussion. Write a troubleshooting guide entry for users who hit the same problem. Answer in English using exactly these three sections:

1. Problem (what the user observed):
2. Cause (why it happened):
3. Solution (the concrete code change, configuration change or steps that resolved it):

--- Start of Issue Content ---
{text}
--- End of Issue Content ---"#
        ),
        SummaryKind::FeatureRequest => format!(
            r#"Below is an open GitHub issue. If it asks for new functionality, extract it as a to-do item. Answer in English using exactly these three sections:

1. Request (the feature being asked for):
2. Motivation (the use case behind it):
3. Suggested approach (how it could be implemented, or "None given"):

--- Start of Issue Content ---
{text}
--- End of Issue Content ---"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IssueState;
    use anyhow::Result;
    use chrono::{TimeZone, Utc};

    struct Echo;

    impl TextGenerator for Echo {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(format!("len={}", prompt.len()))
        }
    }

    struct Failing;

    impl TextGenerator for Failing {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            anyhow::bail!("quota exceeded")
        }
    }

    fn issue(body: Option<&str>) -> Issue {
        Issue {
            number: 1,
            title: "t".to_string(),
            body: body.map(str::to_string),
            html_url: "https://github.com/o/r/issues/1".to_string(),
            state: IssueState::Closed,
            created_at: None,
            closed_at: None,
            pull_request: None,
        }
    }

    #[test]
    fn test_issue_text_with_comments() {
        let comments = vec![
            Comment {
                body: Some("try restarting".to_string()),
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            },
            Comment {
                body: None,
                created_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            },
        ];

        let text = issue_text(&issue(Some("  it''s broken \n")), &comments);
        assert_eq!(
            text,
            "it's broken\n**💬 Comment 1:**\ntry restarting\n\n**💬 Comment 2:**\n\n"
        );
    }

    #[test]
    fn test_issue_body_missing() {
        assert_eq!(issue_body(&issue(None)), "");
    }

    #[test]
    fn test_prompt_embeds_text() {
        let prompt = build_prompt(SummaryKind::FeatureRequest, "add dark mode");
        assert!(prompt.contains("add dark mode"));
        assert!(prompt.contains("Request"));
    }

    #[tokio::test]
    async fn test_summarize_passes_through() {
        let summarizer = Summarizer::new(Echo);
        let summary = summarizer.summarize(SummaryKind::Troubleshooting, "x").await;
        assert!(summary.starts_with("len="));
    }

    #[tokio::test]
    async fn test_summarize_falls_back_on_error() {
        let summarizer = Summarizer::new(Failing);

        let summary = summarizer.summarize(SummaryKind::Troubleshooting, "x").await;
        assert_eq!(summary, TROUBLESHOOTING_FALLBACK);

        let summary = summarizer.summarize(SummaryKind::FeatureRequest, "x").await;
        assert_eq!(summary, FEATURE_REQUEST_FALLBACK);
    }
}
