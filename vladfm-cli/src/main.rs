// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! vladFM CLI - read and talk back to the vladFM football blog from the
//! command line.
//!
//! # Examples
//!
//! ```bash
//! # Newest posts
//! vladfm
//!
//! # Most discussed posts tagged "transfers", page 2
//! vladfm feed --sort discussed --tag transfers --page 2
//!
//! # Read a post with its comments
//! vladfm post clasico-ratings-are-in
//!
//! # Vote and comment
//! vladfm vote 12 up
//! vladfm comment clasico-ratings-are-in --author kris --content "Pedri!"
//!
//! # JSON output
//! vladfm stats --format json --pretty
//!
//! # Try everything without a backend
//! vladfm --offline feed --sort top
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vladfm_fetch::GatewayError;
use vladfm_store::StoreError;

use commands::{comment, config, feed, identity, post, site, user, vote};

// ============================================================================
// CLI Definition
// ============================================================================

/// vladFM CLI - football blog client.
#[derive(Parser)]
#[command(name = "vladfm")]
#[command(about = "Command-line client for the vladFM football blog")]
#[command(long_about = r#"
vladFM is a small football blog with anonymous voting and comments.

Votes are tied to a local fingerprint stored in the config directory,
so the same machine keeps the same vote across runs.

Examples:
  vladfm                             # Newest posts
  vladfm feed --sort top --page 2    # Top posts, second page
  vladfm post <slug>                 # Read a post
  vladfm vote <post-id> up           # Upvote
  vladfm --offline feed              # Demo data, no backend needed
"#)]
#[command(version)]
#[command(author = "vladFM Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, shows the feed.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL (overrides the config file).
    #[arg(long, global = true, env = "VLADFM_BASE_URL")]
    pub base_url: Option<String>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Use built-in demo data instead of the backend.
    #[arg(long, global = true)]
    pub offline: bool,

    /// Keep the fingerprint in memory only.
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List posts (default if no command specified).
    #[command(visible_alias = "f")]
    Feed(feed::FeedArgs),

    /// Show a post with its comments.
    #[command(visible_alias = "p")]
    Post(post::PostArgs),

    /// Comment on a post.
    Comment(comment::CommentArgs),

    /// Vote on a post.
    Vote(vote::VoteArgs),

    /// List tags.
    Tags,

    /// Show site statistics.
    Stats,

    /// List the regulars.
    Regulars,

    /// Show a user's profile.
    User(user::UserArgs),

    /// Show the local fingerprint.
    Whoami,

    /// Resolve an author's profile link.
    Link(user::LinkArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Post or user not found.
    NotFound = 2,
    /// Input rejected before reaching the backend.
    InvalidInput = 3,
    /// Backend unreachable or timed out.
    Network = 4,
}

impl ExitCode {
    /// Picks the exit code for an error.
    pub fn for_error(err: &anyhow::Error) -> Self {
        let gateway = err
            .downcast_ref::<GatewayError>()
            .or_else(|| err.downcast_ref::<StoreError>().and_then(StoreError::as_gateway));

        if let Some(gateway) = gateway {
            if gateway.is_not_found() {
                return Self::NotFound;
            }
            if gateway.is_network() {
                return Self::Network;
            }
            return Self::Error;
        }
        if matches!(err.downcast_ref::<StoreError>(), Some(StoreError::Core(_)))
            || err.downcast_ref::<vladfm_core::CoreError>().is_some()
        {
            return Self::InvalidInput;
        }
        Self::Error
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("vladfm=debug,info")
    } else {
        EnvFilter::new("vladfm=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Feed(args)) => feed::run(args, &cli).await,
        Some(Commands::Post(args)) => post::run(args, &cli).await,
        Some(Commands::Comment(args)) => comment::run(args, &cli).await,
        Some(Commands::Vote(args)) => vote::run(args, &cli).await,
        Some(Commands::Tags) => site::run_tags(&cli).await,
        Some(Commands::Stats) => site::run_stats(&cli).await,
        Some(Commands::Regulars) => site::run_regulars(&cli).await,
        Some(Commands::User(args)) => user::run(args, &cli).await,
        Some(Commands::Whoami) => identity::run(&cli).await,
        Some(Commands::Link(args)) => user::run_link(args, &cli),
        Some(Commands::Config(args)) => config::run(args, &cli).await,
        None => feed::run(&feed::FeedArgs::default(), &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {}", describe(&e));
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}

/// One-line message for an error, preferring the backend's `detail`.
fn describe(err: &anyhow::Error) -> String {
    let gateway = err
        .downcast_ref::<GatewayError>()
        .or_else(|| err.downcast_ref::<StoreError>().and_then(StoreError::as_gateway));
    match gateway {
        Some(e @ GatewayError::Api { .. }) => e.detail(),
        _ => format!("{err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["vladfm", "feed", "--sort", "top", "--offline", "-f", "json"]).unwrap();
        assert!(cli.offline);
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Some(Commands::Feed(args)) => assert_eq!(args.sort, Some(vladfm_core::FeedSort::Top)),
            _ => panic!("expected feed command"),
        }
    }

    #[test]
    fn test_exit_codes() {
        let not_found = anyhow::Error::from(StoreError::from(GatewayError::api(404, "")));
        assert_eq!(ExitCode::for_error(&not_found), ExitCode::NotFound);

        let network = anyhow::Error::from(GatewayError::Network("refused".into()));
        assert_eq!(ExitCode::for_error(&network), ExitCode::Network);

        let invalid = anyhow::Error::from(StoreError::from(vladfm_core::CoreError::InvalidPage(0)));
        assert_eq!(ExitCode::for_error(&invalid), ExitCode::InvalidInput);

        assert_eq!(ExitCode::for_error(&anyhow::anyhow!("boom")), ExitCode::Error);
    }

    #[test]
    fn test_describe_prefers_backend_detail() {
        let err = anyhow::Error::from(StoreError::from(GatewayError::not_found("User not found")));
        assert_eq!(describe(&err), "User not found");
    }
}
