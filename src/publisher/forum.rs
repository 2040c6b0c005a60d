use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::{post_title, Publisher};

/// Posts the guide as a new topic through a Discourse-style forum API
pub struct ForumPublisher {
    client: Client,
    base_url: String,
    api_key: String,
    username: String,
    category: Option<u64>,
}

#[derive(Debug, Serialize)]
struct NewPost {
    title: String,
    raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<u64>,
}

impl ForumPublisher {
    pub fn new(base_url: &str, api_key: String, username: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            username,
            category: None,
        }
    }

    pub fn with_category(mut self, category: Option<u64>) -> Self {
        self.category = category;
        self
    }
}

impl Publisher for ForumPublisher {
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    async fn publish(&self, destination: &str, content: &str) -> Result<()> {
        let post = NewPost {
            title: post_title(destination),
            raw: content.to_string(),
            category: self.category,
        };

        debug!("Sending forum post");

        let response = self
            .client
            .post(format!("{}/posts.json", self.base_url))
            .header("Api-Key", &self.api_key)
            .header("Api-Username", &self.username)
            .json(&post)
            .send()
            .await
            .context("Failed to send forum post")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Forum post failed");
            anyhow::bail!("Forum returned error: {} - {}", status, body);
        }

        info!("Forum post created");
        Ok(())
    }
}
