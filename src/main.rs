use anyhow::{Context, Result};
use clap::Parser;
use release_party::commands::{self, ReleaseInput};
use release_party::config::REPO_ENV;
use std::path::PathBuf;

/// release-party - GitHub releases for deploy tags
///
/// Creates or updates the GitHub release that belongs to a deploy tag.
///
/// The GITHUB_RELEASE_TOKEN environment variable must hold a token that can
/// write releases. The repository defaults to the 'origin' remote.
///
/// Examples:
///   release-party verify
///   release-party create --tag heroku/v42 --name v42 --message-file msg.txt
///   release-party sync --manifest tags.json
#[derive(Parser, Debug)]
#[command(author, version = env!("RELEASE_PARTY_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Repository in the format "owner/repo" (defaults to the 'origin' remote)
    #[arg(long, env = REPO_ENV, value_name = "OWNER/REPO", global = true)]
    pub repo: Option<String>,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check the token and repository configuration
    Verify,

    /// Create the release for a freshly pushed tag
    Create(ReleaseArgs),

    /// Update the release for a tag, or create it if missing
    Publish(ReleaseArgs),

    /// Update or create releases for every tag in a manifest
    Sync(SyncArgs),
}

#[derive(clap::Args, Debug)]
pub struct ReleaseArgs {
    /// Tag the release belongs to
    #[arg(long, value_name = "TAG")]
    pub tag: String,

    /// Release title (defaults to the tag)
    #[arg(long)]
    pub name: Option<String>,

    /// Release body
    #[arg(long, conflicts_with = "message_file", required_unless_present = "message_file")]
    pub message: Option<String>,

    /// Read the release body from a file
    #[arg(long, value_name = "PATH")]
    pub message_file: Option<PathBuf>,
}

impl ReleaseArgs {
    fn into_input(self) -> Result<ReleaseInput> {
        let message = match (self.message, self.message_file) {
            (Some(message), _) => message,
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read message file {}", path.display()))?,
            (None, None) => anyhow::bail!("either --message or --message-file is required"),
        };

        Ok(ReleaseInput {
            tag_name: self.tag,
            name: self.name,
            message,
        })
    }
}

#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    /// JSON array of {tag_name, name?, message | commit + since + commits}
    #[arg(long, value_name = "PATH")]
    pub manifest: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = release_party::runtime::RealRuntime;
    let repo = cli.repo.as_deref();

    match cli.command {
        Commands::Verify => commands::verify(&runtime, repo, cli.api_url).await?,
        Commands::Create(args) => {
            commands::create(&runtime, repo, cli.api_url, &args.into_input()?).await?
        }
        Commands::Publish(args) => {
            commands::publish(&runtime, repo, cli.api_url, &args.into_input()?).await?
        }
        Commands::Sync(args) => {
            commands::sync(&runtime, repo, cli.api_url, &args.manifest).await?
        }
    }
    Ok(())
}
