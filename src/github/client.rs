use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::GitHubConfig;
use crate::models::{Comment, Issue, IssueState};

/// Errors raised by the GitHub issue source
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The API answered with a non-success status
    #[error("GitHub API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    /// Transport or decode failure
    #[error("GitHub request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// GitHub REST client for reading issues and their comments
pub struct GitHubClient {
    client: Client,
    token: String,
    api_url: String,
    per_page: u32,
}

impl GitHubClient {
    /// Create a new GitHub client with the given token
    pub fn new(token: &str, config: &GitHubConfig) -> Result<Self, GitHubError> {
        let client = Client::builder()
            .user_agent(concat!("tsg-maker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            token: token.to_string(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            per_page: config.per_page.max(1),
        })
    }

    /// List every issue in the given state, pull requests excluded
    #[instrument(skip(self))]
    pub async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        state: IssueState,
    ) -> Result<Vec<Issue>, GitHubError> {
        let url = format!("{}/repos/{}/{}/issues", self.api_url, owner, repo);

        let items: Vec<Issue> = self.get_all_pages(&url, &[("state", state.as_str())]).await?;
        let total = items.len();

        let issues: Vec<Issue> = items
            .into_iter()
            .filter(|issue| !issue.is_pull_request())
            .collect();

        info!(
            count = issues.len(),
            pull_requests = total - issues.len(),
            "Fetched issues"
        );

        Ok(issues)
    }

    /// List every comment on an issue, oldest first
    #[instrument(skip(self))]
    pub async fn list_comments(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> Result<Vec<Comment>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url, owner, repo, issue_number
        );

        let mut comments: Vec<Comment> = self.get_all_pages(&url, &[]).await?;
        comments.sort_by_key(|c| c.created_at);

        debug!(count = comments.len(), "Fetched comments");

        Ok(comments)
    }

    /// Follow `page=1,2,..` until the API returns an empty page
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, GitHubError> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let batch: Vec<T> = self.get_page(url, params, page).await?;
            if batch.is_empty() {
                break;
            }

            debug!(page, count = batch.len(), "Fetched page");
            items.extend(batch);
            page += 1;
        }

        Ok(items)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        page: u32,
    ) -> Result<Vec<T>, GitHubError> {
        let per_page = self.per_page.to_string();
        let page = page.to_string();

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .query(params)
            .query(&[("per_page", per_page.as_str()), ("page", page.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

/// Parse owner and repo from a repo string like "owner/repo"
pub fn parse_repo(repo: &str) -> anyhow::Result<(&str, &str)> {
    let parts: Vec<&str> = repo.split('/').collect();
    if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("Invalid repo format. Expected 'owner/repo', got: {}", repo);
    }
    Ok((parts[0], parts[1]))
}
