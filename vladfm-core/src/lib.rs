// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # vladFM Core
//!
//! Core types, models, and routing helpers for the vladFM client.
//!
//! This crate provides the foundational abstractions used across all other
//! vladFM crates, including:
//!
//! - Domain models (posts, comments, votes, tags, profiles, site stats)
//! - Feed query types and their page-reset rules
//! - The author roster and route table
//! - Error types
//! - Relative time formatting
//!
//! ## Key Types
//!
//! ### Feed
//! - [`FeedSort`] - Sort modes accepted by the backend
//! - [`FeedQuery`] - Sort, tag filter and page of a feed request
//! - [`FeedResult`] - One page of post summaries plus pagination metadata
//!
//! ### Posts
//! - [`PostSummary`] - Listing entry
//! - [`Post`] - Full post with content
//! - [`Comment`] - Comment on a post
//! - [`Tag`] - Post tag
//!
//! ### Votes
//! - [`VoteValue`] - Down, none, or up
//! - [`VoteTally`] - Vote response as the backend sends it
//! - [`VoteState`] - Confirmed vote of one identity on one post
//!
//! ### Site
//! - [`SiteStats`], [`AuthorSummary`], [`UserProfile`]
//!
//! ### Routing
//! - [`roster::is_regular`], [`roster::author_link`], [`Route`]

pub mod error;
pub mod models;
pub mod roster;
pub mod timeago;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Feed
    FeedQuery,
    FeedResult,
    FeedSort,
    // Posts
    Comment,
    Post,
    PostSummary,
    Tag,
    // Votes
    VoteState,
    VoteTally,
    VoteValue,
    // Site
    AuthorSummary,
    SiteStats,
    UserComment,
    UserProfile,
    UserVote,
};

pub use roster::{author_link, is_regular, Route, REGULARS};
pub use timeago::time_ago;
