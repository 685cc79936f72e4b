//! Feed command implementation.

use anyhow::Result;
use clap::Args;
use tracing::debug;
use vladfm_core::FeedSort;
use vladfm_store::{FeedOutcome, StoreError};

use super::{emit, open_session};
use crate::Cli;
use crate::output::JsonFormatter;

/// Arguments for the feed command.
#[derive(Debug, Args)]
pub struct FeedArgs {
    /// Sort mode: new, top or discussed (defaults to the configured sort).
    #[arg(long, short)]
    pub sort: Option<FeedSort>,

    /// Only show posts with this tag slug.
    #[arg(long, short)]
    pub tag: Option<String>,

    /// Page number, starting at 1.
    #[arg(long, short, default_value_t = 1)]
    pub page: u32,
}

impl Default for FeedArgs {
    fn default() -> Self {
        Self {
            sort: None,
            tag: None,
            page: 1,
        }
    }
}

/// Runs the feed command.
pub async fn run(args: &FeedArgs, cli: &Cli) -> Result<()> {
    let session = open_session(cli).await?;
    let feed = &session.state.feed;

    // Same transitions an interactive client makes: sort and tag land on
    // page 1, then the page moves within that listing.
    if let Some(sort) = args.sort {
        feed.sort_request(sort);
    }
    if args.tag.is_some() {
        feed.tag_request(args.tag.clone());
    }
    let request = feed.page_request(args.page)?;
    debug!(query = ?request.query, "Fetching feed");

    session.retry.run(|| {
        let request = request.clone();
        async move {
            match feed.fetch(request).await {
                FeedOutcome::Failed(e) => Err(StoreError::from(e)),
                FeedOutcome::Loaded | FeedOutcome::Stale => Ok(()),
            }
        }
    })
    .await?;

    let state = feed.state();
    let json = JsonFormatter::new(cli.pretty).feed_output(&state);
    emit(cli, |text| text.format_feed(&state), &json)
}
