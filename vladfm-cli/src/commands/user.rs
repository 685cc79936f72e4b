//! User profile and author link commands.

use anyhow::Result;
use clap::Args;
use tracing::debug;
use vladfm_core::is_regular;
use vladfm_store::StoreError;

use super::{emit, open_session};
use crate::Cli;
use crate::output::JsonFormatter;

/// Arguments for the user command.
#[derive(Debug, Args)]
pub struct UserArgs {
    /// Username, exactly as it appears on posts and comments.
    pub name: String,
}

/// Arguments for the link command.
#[derive(Debug, Args)]
pub struct LinkArgs {
    /// Author name.
    pub name: String,
}

/// Runs the user command.
pub async fn run(args: &UserArgs, cli: &Cli) -> Result<()> {
    let session = open_session(cli).await?;
    let gateway = &session.gateway;

    let profile = session.retry.run(|| async {
        gateway
            .get_user_profile(&args.name)
            .await
            .map_err(StoreError::from)
    })
    .await?;
    debug!(posts = profile.posts.len(), comments = profile.comments.len(), "Profile loaded");

    emit(cli, |text| text.format_profile(&profile), &profile)
}

/// Prints the profile path for an author. Needs no backend.
pub fn run_link(args: &LinkArgs, cli: &Cli) -> Result<()> {
    debug!(name = %args.name, regular = is_regular(&args.name), "Resolving author link");
    let json = JsonFormatter::new(cli.pretty).link_output(&args.name);
    emit(cli, |text| text.format_link(&args.name), &json)
}
