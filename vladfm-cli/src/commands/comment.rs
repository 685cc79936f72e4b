//! Comment command implementation.

use anyhow::Result;
use clap::Args;

use super::{emit, open_session};
use crate::Cli;
use crate::output::JsonFormatter;

/// Arguments for the comment command.
#[derive(Debug, Args)]
pub struct CommentArgs {
    /// Slug of the post to comment on.
    pub slug: String,

    /// Name to sign with (defaults to the configured name, then "anonymous").
    #[arg(long, short)]
    pub author: Option<String>,

    /// Comment text.
    #[arg(long, short)]
    pub content: String,
}

/// Runs the comment command.
pub async fn run(args: &CommentArgs, cli: &Cli) -> Result<()> {
    let session = open_session(cli).await?;
    let posts = &session.state.post;

    let author = args
        .author
        .as_deref()
        .unwrap_or_else(|| session.state.config().author_or_anonymous());
    // Reject bad input before any request goes out.
    vladfm_store::validate_comment(author, &args.content)?;

    session.retry.run(|| posts.open(&args.slug)).await?;
    // Posting is not idempotent, so it is never retried.
    let comment = posts.add_comment(author, &args.content).await?;

    let json = JsonFormatter::new(cli.pretty).comment_output(&comment);
    emit(cli, |text| text.format_comment(&comment), &json)
}
