//! Post command implementation.

use anyhow::Result;
use clap::Args;
use tracing::warn;

use super::{emit, open_session};
use crate::Cli;
use crate::output::JsonFormatter;

/// Arguments for the post command.
#[derive(Debug, Args)]
pub struct PostArgs {
    /// Post slug, as shown under each feed entry.
    pub slug: String,
}

/// Runs the post command.
pub async fn run(args: &PostArgs, cli: &Cli) -> Result<()> {
    let session = open_session(cli).await?;
    let state = &session.state;

    let post = session.retry.run(|| state.post.open(&args.slug)).await?;

    // The post is still worth showing without the local vote.
    let vote = match session.retry.run(|| state.votes.get_vote(post.id())).await {
        Ok(vote) => vote,
        Err(e) => {
            warn!(error = %e, "Could not load your vote");
            None
        }
    };

    let opened = state.post.state();
    let comments = opened.comments;
    let json = JsonFormatter::new(cli.pretty).post_detail_output(&post, &comments, vote.as_ref());
    emit(cli, |text| text.format_post(&post, &comments, vote.as_ref()), &json)
}
