pub mod client;

pub use client::{parse_repo, GitHubClient, GitHubError};
