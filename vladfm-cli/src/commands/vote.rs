//! Vote command implementation.

use anyhow::Result;
use clap::{Args, ValueEnum};
use vladfm_core::VoteValue;

use super::{emit, open_session};
use crate::Cli;
use crate::output::JsonFormatter;

/// Arguments for the vote command.
#[derive(Debug, Args)]
pub struct VoteArgs {
    /// Numeric post id, as shown on the post page.
    pub post_id: u64,

    /// Vote to cast.
    #[arg(value_enum)]
    pub choice: VoteChoice,

    /// Retract instead when the same vote is already cast.
    #[arg(long)]
    pub toggle: bool,
}

/// Vote choices on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VoteChoice {
    /// Upvote.
    Up,
    /// Downvote.
    Down,
    /// Retract any vote.
    Clear,
}

impl From<VoteChoice> for VoteValue {
    fn from(choice: VoteChoice) -> Self {
        match choice {
            VoteChoice::Up => Self::Up,
            VoteChoice::Down => Self::Down,
            VoteChoice::Clear => Self::None,
        }
    }
}

/// Runs the vote command.
pub async fn run(args: &VoteArgs, cli: &Cli) -> Result<()> {
    let session = open_session(cli).await?;
    let votes = &session.state.votes;
    let value = VoteValue::from(args.choice);

    let vote = if args.toggle {
        // Toggling compares against the confirmed vote, so load it first.
        session.retry.run(|| votes.get_vote(args.post_id)).await?;
        votes.toggle(args.post_id, value).await?
    } else {
        votes.cast_vote(args.post_id, value).await?
    };

    let json = JsonFormatter::new(cli.pretty).vote_output(&vote);
    emit(cli, |text| text.format_vote(&vote), &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_maps_to_vote_value() {
        assert_eq!(VoteValue::from(VoteChoice::Up), VoteValue::Up);
        assert_eq!(VoteValue::from(VoteChoice::Down), VoteValue::Down);
        assert_eq!(VoteValue::from(VoteChoice::Clear), VoteValue::None);
    }
}
