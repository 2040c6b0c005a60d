use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::OpenAiAdapter;
use crate::config::{Config, PublisherKind};
use crate::github::{parse_repo, GitHubClient};
use crate::ledger;
use crate::models::{IssueState, RunReport, SummaryKind};
use crate::pipeline::{publish_ledger, Pipeline};
use crate::publisher::{ForumPublisher, GitHubIssuePublisher};
use crate::summarizer::Summarizer;

/// What one invocation does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Append troubleshooting summaries for issues in `state`, then optionally publish
    Fetch { state: IssueState, publish: bool },
    /// Extract feature requests from open issues into the to-do list
    Todo,
    /// Publish the existing guide only
    Upload,
}

/// Secrets supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub github_token: Option<String>,
    pub openai_api_key: Option<String>,
    pub forum_api_key: Option<String>,
    pub forum_username: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub owner: String,
    pub repo: String,
    pub mode: Mode,
    /// Troubleshooting guide
    pub output: PathBuf,
    /// To-do list
    pub todo_output: PathBuf,
    pub credentials: Credentials,
}

/// Result of [`execute`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub report: Option<RunReport>,
    pub published: bool,
}

/// Run the pass selected by `invocation.mode`
pub async fn execute(config: &Config, invocation: &Invocation) -> Result<Outcome> {
    info!(mode = ?invocation.mode, owner = %invocation.owner, repo = %invocation.repo, "Starting run");

    match invocation.mode {
        Mode::Upload => {
            let published = publish_guide(config, invocation).await?;
            Ok(Outcome {
                report: None,
                published,
            })
        }
        Mode::Todo => {
            let report = ingest(
                config,
                invocation,
                IssueState::Open,
                SummaryKind::FeatureRequest,
            )
            .await?;
            Ok(Outcome {
                report: Some(report),
                published: false,
            })
        }
        Mode::Fetch { state, publish } => {
            let report = ingest(config, invocation, state, SummaryKind::Troubleshooting).await?;
            let published = if publish {
                publish_guide(config, invocation).await?
            } else {
                false
            };
            Ok(Outcome {
                report: Some(report),
                published,
            })
        }
    }
}

async fn ingest(
    config: &Config,
    invocation: &Invocation,
    state: IssueState,
    kind: SummaryKind,
) -> Result<RunReport> {
    let credentials = &invocation.credentials;
    let token = credentials
        .github_token
        .as_deref()
        .context("GITHUB_TOKEN not set")?;
    let openai_key = credentials
        .openai_api_key
        .clone()
        .context("OPENAI_API_KEY not set")?;

    let output = match kind {
        SummaryKind::Troubleshooting => &invocation.output,
        SummaryKind::FeatureRequest => &invocation.todo_output,
    };

    let github = GitHubClient::new(token, &config.github)?;
    let summarizer = Summarizer::new(OpenAiAdapter::from_config(openai_key, &config.models.openai));
    let pipeline = Pipeline::new(github, summarizer, ledger::open(config.ledger.format, output));

    pipeline
        .run(&invocation.owner, &invocation.repo, state, kind)
        .await
}

/// Publish the troubleshooting guide; publisher settings are only read when it has content
async fn publish_guide(config: &Config, invocation: &Invocation) -> Result<bool> {
    let guide = ledger::open(config.ledger.format, &invocation.output);
    let destination = invocation.repo.as_str();

    match config.publisher.kind {
        PublisherKind::Forum => {
            publish_ledger(guide.as_ref(), destination, || {
                forum_publisher(config, &invocation.credentials)
            })
            .await
        }
        PublisherKind::GithubIssue => {
            publish_ledger(guide.as_ref(), destination, || {
                github_publisher(config, invocation)
            })
            .await
        }
    }
}

fn forum_publisher(config: &Config, credentials: &Credentials) -> Result<ForumPublisher> {
    let forum_url = config
        .publisher
        .forum_url
        .as_deref()
        .context("publisher.forum_url is not configured")?;
    let api_key = credentials
        .forum_api_key
        .clone()
        .context("FORUM_API_KEY not set")?;
    let username = credentials
        .forum_username
        .clone()
        .context("FORUM_USERNAME not set")?;

    Ok(ForumPublisher::new(forum_url, api_key, username).with_category(config.publisher.category))
}

fn github_publisher(config: &Config, invocation: &Invocation) -> Result<GitHubIssuePublisher> {
    let token = invocation
        .credentials
        .github_token
        .as_deref()
        .context("GITHUB_TOKEN not set")?;

    let (owner, repo) = match config.publisher.destination.as_deref() {
        Some(destination) => parse_repo(destination)?,
        None => (invocation.owner.as_str(), invocation.repo.as_str()),
    };

    GitHubIssuePublisher::new(token, &config.github.api_url, owner, repo)
}

