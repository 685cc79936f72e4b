//! Vote types.
//!
//! The backend keeps one vote per (post, fingerprint). Its vote endpoints
//! answer with a [`VoteTally`]; the client lifts that into a [`VoteState`]
//! by attaching the post id and identity the request was made for.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Vote Value
// ============================================================================

/// A single visitor's vote on a post. `None` (wire value `0`) retracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum VoteValue {
    /// Downvote (`-1`).
    Down,
    /// No vote (`0`).
    #[default]
    None,
    /// Upvote (`1`).
    Up,
}

impl VoteValue {
    /// Wire value.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Down => -1,
            Self::None => 0,
            Self::Up => 1,
        }
    }

    /// Returns true for an actual up or down vote.
    pub fn is_cast(self) -> bool {
        self != Self::None
    }

    /// Value to send when the visitor clicks `clicked` while `self` is
    /// confirmed: clicking the active arrow again retracts.
    #[must_use]
    pub fn toggled(self, clicked: VoteValue) -> VoteValue {
        if self == clicked { Self::None } else { clicked }
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Down),
            0 => Ok(Self::None),
            1 => Ok(Self::Up),
            other => Err(CoreError::InvalidVoteValue(other)),
        }
    }
}

impl From<VoteValue> for i64 {
    fn from(value: VoteValue) -> Self {
        value.as_i64()
    }
}

impl fmt::Display for VoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Down => f.write_str("down"),
            Self::None => f.write_str("none"),
            Self::Up => f.write_str("up"),
        }
    }
}

// ============================================================================
// Vote Tally (wire)
// ============================================================================

/// Body of `GET`/`POST /posts/{id}/vote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Sum of all votes on the post.
    pub score: i64,
    /// The requesting fingerprint's vote.
    pub user_vote: VoteValue,
    /// Post truth score after the vote.
    #[serde(default)]
    pub truth_score: i32,
}

// ============================================================================
// Vote State
// ============================================================================

/// Server-confirmed vote of one identity on one post.
///
/// A state whose `value` is [`VoteValue::None`] is the "no vote" state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteState {
    /// Post id.
    pub post_id: u64,
    /// Fingerprint the vote belongs to.
    pub identity: String,
    /// Confirmed value.
    pub value: VoteValue,
    /// Post score at confirmation time.
    pub score: i64,
    /// Post truth score at confirmation time.
    pub truth_score: i32,
}

impl VoteState {
    /// Builds a state from a tally returned for `post_id` and `identity`.
    pub fn from_tally(post_id: u64, identity: impl Into<String>, tally: VoteTally) -> Self {
        Self {
            post_id,
            identity: identity.into(),
            value: tally.user_vote,
            score: tally.score,
            truth_score: tally.truth_score,
        }
    }

    /// Returns true if an up or down vote is recorded.
    pub fn is_cast(&self) -> bool {
        self.value.is_cast()
    }
}
