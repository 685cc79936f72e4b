//! Whoami command - show the local fingerprint.

use anyhow::Result;

use super::{emit, open_session};
use crate::Cli;
use crate::output::IdentityOutput;

/// Runs the whoami command.
pub async fn run(cli: &Cli) -> Result<()> {
    let session = open_session(cli).await?;
    let provider = session.state.identity();
    let identity = provider.identity();
    let path = session.identity_path.as_deref();

    let json = IdentityOutput {
        fingerprint: identity.to_string(),
        stored_in: path.map(|p| p.display().to_string()),
    };
    emit(cli, |text| text.format_identity(identity.as_str(), path, provider.signals()), &json)
}
