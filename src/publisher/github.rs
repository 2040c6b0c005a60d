use anyhow::{Context, Result};
use octocrab::Octocrab;
use tracing::{debug, info, instrument};

use super::{post_title, Publisher};

/// Publishes the guide as a new issue in a GitHub repository
pub struct GitHubIssuePublisher {
    client: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubIssuePublisher {
    /// Create a publisher targeting `owner/repo` on the API at `api_url`
    pub fn new(token: &str, api_url: &str, owner: &str, repo: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .base_uri(api_url)
            .context("Invalid GitHub API URL")?
            .personal_token(token.to_string())
            .build()
            .context("Failed to create GitHub client")?;

        Ok(Self {
            client,
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl Publisher for GitHubIssuePublisher {
    #[instrument(skip(self, content), fields(owner = %self.owner, repo = %self.repo))]
    async fn publish(&self, destination: &str, content: &str) -> Result<()> {
        info!("Creating guide issue");

        let issue = self
            .client
            .issues(&self.owner, &self.repo)
            .create(post_title(destination))
            .body(content)
            .send()
            .await
            .context("Failed to create guide issue")?;

        debug!(number = issue.number, "Issue created");
        println!("Published guide as {}", issue.html_url);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_json(api: &str) -> serde_json::Value {
        json!({
            "login": "octocat",
            "id": 1,
            "node_id": "MDQ6VXNlcjE=",
            "avatar_url": "https://github.com/images/error/octocat_happy.gif",
            "gravatar_id": "",
            "url": format!("{api}/users/octocat"),
            "html_url": "https://github.com/octocat",
            "followers_url": format!("{api}/users/octocat/followers"),
            "following_url": format!("{api}/users/octocat/following{{/other_user}}"),
            "gists_url": format!("{api}/users/octocat/gists{{/gist_id}}"),
            "starred_url": format!("{api}/users/octocat/starred{{/owner}}{{/repo}}"),
            "subscriptions_url": format!("{api}/users/octocat/subscriptions"),
            "organizations_url": format!("{api}/users/octocat/orgs"),
            "repos_url": format!("{api}/users/octocat/repos"),
            "events_url": format!("{api}/users/octocat/events{{/privacy}}"),
            "received_events_url": format!("{api}/users/octocat/received_events"),
            "type": "User",
            "site_admin": false
        })
    }

    fn created_issue_json(api: &str) -> serde_json::Value {
        let issue_api = format!("{api}/repos/acme/support/issues/12");
        json!({
            "id": 1,
            "node_id": "MDU6SXNzdWUx",
            "url": issue_api,
            "repository_url": format!("{api}/repos/acme/support"),
            "labels_url": format!("{issue_api}/labels{{/name}}"),
            "comments_url": format!("{issue_api}/comments"),
            "events_url": format!("{issue_api}/events"),
            "html_url": "https://github.com/acme/support/issues/12",
            "number": 12,
            "state": "open",
            "title": "[widgets] Troubleshooting Guide",
            "body": "guide body",
            "user": user_json(api),
            "labels": [],
            "assignee": null,
            "assignees": [],
            "milestone": null,
            "locked": false,
            "active_lock_reason": null,
            "comments": 0,
            "pull_request": null,
            "closed_at": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "closed_by": null,
            "author_association": "OWNER"
        })
    }

    #[tokio::test]
    async fn test_publish_creates_issue() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/acme/support/issues"))
            .and(body_partial_json(json!({
                "title": "[widgets] Troubleshooting Guide",
                "body": "guide body"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(created_issue_json(&server.uri())))
            .expect(1)
            .mount(&server)
            .await;

        let publisher =
            GitHubIssuePublisher::new("test-token", &server.uri(), "acme", "support").unwrap();

        publisher.publish("widgets", "guide body").await.unwrap();
    }

    #[tokio::test]
    async fn test_publish_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/acme/support/issues"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&server)
            .await;

        let publisher =
            GitHubIssuePublisher::new("test-token", &server.uri(), "acme", "support").unwrap();

        let err = publisher.publish("widgets", "guide body").await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to create guide issue"));
    }
}
