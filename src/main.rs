use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tsg_maker::{execute, Config, Credentials, Invocation, IssueState, Mode};

#[derive(Parser)]
#[command(name = "tsg-maker")]
#[command(about = "Turn GitHub issues into an incremental Markdown troubleshooting guide")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, default_value = ".tsg/config.yml")]
    config: PathBuf,

    /// Repository owner
    #[arg(long, env = "GITHUB_OWNER")]
    owner: String,

    /// Repository name
    #[arg(long, env = "GITHUB_REPO")]
    repo: String,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Forum API key used when publishing
    #[arg(long, env = "FORUM_API_KEY", hide_env_values = true)]
    forum_api_key: Option<String>,

    /// Forum user the post is created as
    #[arg(long, env = "FORUM_USERNAME")]
    forum_username: Option<String>,

    /// Issue state to ingest in the default mode
    #[arg(long, value_enum, default_value_t = StateArg::Closed)]
    state: StateArg,

    /// Troubleshooting guide (ledger) file
    #[arg(long, env = "TSG_OUTPUT", default_value = "troubleshooting_guide.md")]
    output: PathBuf,

    /// To-do list file written by --todo
    #[arg(long, env = "TSG_TODO_OUTPUT", default_value = "todo_list.md")]
    todo_output: PathBuf,

    /// Only publish the existing guide
    #[arg(long, conflicts_with_all = ["todo", "publish"])]
    upload: bool,

    /// Extract feature requests from open issues into the to-do list
    #[arg(long, conflicts_with = "upload")]
    todo: bool,

    /// Publish the guide after appending new issues (ignored with --todo)
    #[arg(long)]
    publish: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum StateArg {
    Open,
    Closed,
}

impl From<StateArg> for IssueState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Open => IssueState::Open,
            StateArg::Closed => IssueState::Closed,
        }
    }
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.upload {
            Mode::Upload
        } else if self.todo {
            Mode::Todo
        } else {
            Mode::Fetch {
                state: self.state.into(),
                publish: self.publish,
            }
        }
    }

    fn into_invocation(self) -> Invocation {
        Invocation {
            mode: self.mode(),
            owner: self.owner,
            repo: self.repo,
            output: self.output,
            todo_output: self.todo_output,
            credentials: Credentials {
                github_token: self.github_token,
                openai_api_key: self.openai_api_key,
                forum_api_key: self.forum_api_key,
                forum_username: self.forum_username,
            },
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tsg_maker=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let outcome = execute(&config, &cli.into_invocation()).await?;
    info!(?outcome, "Run finished");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["tsg-maker", "--owner", "acme", "--repo", "widgets"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_default_mode_fetches_closed() {
        assert_eq!(
            parse(&[]).mode(),
            Mode::Fetch {
                state: IssueState::Closed,
                publish: false
            }
        );
    }

    #[test]
    fn test_flag_modes() {
        assert_eq!(parse(&["--todo"]).mode(), Mode::Todo);
        assert_eq!(parse(&["--todo", "--publish"]).mode(), Mode::Todo);
        assert_eq!(parse(&["--upload"]).mode(), Mode::Upload);
        assert_eq!(
            parse(&["--state", "open", "--publish"]).mode(),
            Mode::Fetch {
                state: IssueState::Open,
                publish: true
            }
        );
    }

    #[test]
    fn test_forum_credentials_flags() {
        let invocation = parse(&["--forum-api-key", "k", "--forum-username", "bot"]).into_invocation();
        assert_eq!(invocation.credentials.forum_api_key.as_deref(), Some("k"));
        assert_eq!(invocation.credentials.forum_username.as_deref(), Some("bot"));
        assert_eq!(invocation.repo, "widgets");
    }

    #[test]
    fn test_upload_conflicts() {
        let argv = ["tsg-maker", "--owner", "a", "--repo", "b", "--upload", "--todo"];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
