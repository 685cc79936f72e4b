//! Site-wide commands: tags, stats and regulars.

use anyhow::Result;
use tracing::debug;
use vladfm_core::{SiteStats, Tag};

use super::{Session, emit, open_session};
use crate::Cli;
use crate::output::JsonFormatter;

/// Lists the tags.
pub async fn run_tags(cli: &Cli) -> Result<()> {
    let session = open_session(cli).await?;
    let tags = session.retry.run(|| session.state.site.refresh_tags()).await?;

    emit(cli, |text| text.format_tags(&tags), &tags)
}

/// Shows site statistics, with the tag count filled in from the tag list
/// when the backend leaves it out.
pub async fn run_stats(cli: &Cli) -> Result<()> {
    let session = open_session(cli).await?;
    let (mut stats, tags) = load_stats_and_tags(&session).await?;

    if stats.total_tags == 0 && !tags.is_empty() {
        debug!(count = tags.len(), "Filling tag count from tag list");
        stats.total_tags = tags.len() as u64;
    }

    emit(cli, |text| text.format_stats(&stats), &stats)
}

async fn load_stats_and_tags(session: &Session) -> Result<(SiteStats, Vec<Tag>)> {
    let site = &session.state.site;
    let (stats, tags) = futures::future::try_join(
        session.retry.run(|| site.refresh_stats()),
        session.retry.run(|| site.refresh_tags()),
    )
    .await?;
    Ok((stats, tags))
}

/// Lists the regulars with their profile links.
pub async fn run_regulars(cli: &Cli) -> Result<()> {
    let session = open_session(cli).await?;
    let regulars = session.retry.run(|| session.state.site.refresh_regulars()).await?;

    let json = JsonFormatter::new(cli.pretty).regular_outputs(&regulars);
    emit(cli, |text| text.format_regulars(&regulars), &json)
}
