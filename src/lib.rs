pub mod adapters;
pub mod app;
pub mod config;
pub mod github;
pub mod ledger;
pub mod models;
pub mod pipeline;
pub mod publisher;
pub mod summarizer;

pub use adapters::{OpenAiAdapter, TextGenerator};
pub use app::{execute, Credentials, Invocation, Mode, Outcome};
pub use config::Config;
pub use github::{GitHubClient, GitHubError};
pub use ledger::{JsonlLedger, Ledger, MarkdownLedger};
pub use models::*;
pub use pipeline::{publish_ledger, Pipeline};
pub use publisher::{ForumPublisher, GitHubIssuePublisher, Publisher};
pub use summarizer::Summarizer;
