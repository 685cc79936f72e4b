//! Domain models for vladFM.
//!
//! These types mirror the JSON payloads of the `/api` backend. They are
//! read-only records from the client's point of view: the stores replace
//! them wholesale and never patch individual fields.
//!
//! ## Submodules
//!
//! - [`feed`] - Feed query and paginated result
//! - [`post`] - Posts, comments, tags
//! - [`vote`] - Vote values and confirmed vote state
//! - [`site`] - Site statistics, regulars listing, user profiles

mod feed;
mod post;
mod site;
mod timestamp;
mod vote;

pub use feed::{FeedQuery, FeedResult, FeedSort};
pub use post::{Comment, Post, PostSummary, Tag};
pub use site::{AuthorSummary, SiteStats, UserComment, UserProfile, UserVote};
pub use vote::{VoteState, VoteTally, VoteValue};
