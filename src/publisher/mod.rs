pub mod forum;
pub mod github;

pub use forum::ForumPublisher;
pub use github::GitHubIssuePublisher;

use std::future::Future;

use anyhow::Result;

/// Destination for the aggregated guide
pub trait Publisher: Send + Sync {
    /// Post `content` for the repository named by `destination`
    fn publish(&self, destination: &str, content: &str) -> impl Future<Output = Result<()>> + Send;
}

impl<T: Publisher> Publisher for &T {
    fn publish(&self, destination: &str, content: &str) -> impl Future<Output = Result<()>> + Send {
        (**self).publish(destination, content)
    }
}

/// Title used for a published guide
pub fn post_title(destination: &str) -> String {
    format!("[{}] Troubleshooting Guide", destination)
}

/// Remove leading list markers (`- `, `* `, `+ `, `1. `, `1) `) from every line
pub fn strip_list_markers(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());

    for line in markdown.split_inclusive('\n') {
        let rest = line.trim_start_matches([' ', '\t']);
        match list_marker_len(rest) {
            Some(len) => out.push_str(&rest[len..]),
            None => out.push_str(line),
        }
    }

    out
}

fn list_marker_len(line: &str) -> Option<usize> {
    for bullet in ["- ", "* ", "+ "] {
        if line.starts_with(bullet) {
            return Some(bullet.len());
        }
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits > 9 {
        return None;
    }

    let rest = &line[digits..];
    if rest.starts_with(". ") || rest.starts_with(") ") {
        Some(digits + 2)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_list_markers() {
        let input = "### 🔧 Crash\n\n1. Problem: boom\n2) Cause: null\n  - step one\n* step two\n+ step three\n";
        let expected = "### 🔧 Crash\n\nProblem: boom\nCause: null\nstep one\nstep two\nstep three\n";
        assert_eq!(strip_list_markers(input), expected);
    }

    #[test]
    fn test_strip_keeps_non_list_lines() {
        let input = "**💬 Comment 1:**\n---\n2024 was a year\n-not a list\n  indented text\n[View GitHub Issue](https://x/1)";
        assert_eq!(strip_list_markers(input), input);
    }

    #[test]
    fn test_post_title() {
        assert_eq!(post_title("acme"), "[acme] Troubleshooting Guide");
    }
}
