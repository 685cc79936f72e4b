//! Site-wide types: statistics, regulars listing, user profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::PostSummary;
use super::timestamp;
use super::vote::VoteValue;

/// Body of `GET /stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteStats {
    /// Number of posts.
    pub total_posts: u64,
    /// Number of comments.
    pub total_comments: u64,
    /// Number of votes.
    pub total_votes: u64,
    /// Number of tags.
    pub total_tags: u64,
    /// Time of the most recent post.
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_post_at: Option<DateTime<Utc>>,
}

/// Entry of `GET /regulars`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    /// Author name.
    pub name: String,
    /// Number of comments written.
    #[serde(default)]
    pub comments: u64,
}

/// A comment on a user's profile, with its parent post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserComment {
    /// Server id.
    pub id: u64,
    /// Parent post id.
    pub post_id: u64,
    /// Author display name.
    pub author_name: String,
    /// Body text.
    pub content: String,
    /// Creation time.
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    /// Parent post title.
    pub post_title: String,
    /// Parent post slug.
    pub post_slug: String,
}

/// A vote on a user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVote {
    /// Post id.
    pub post_id: u64,
    /// Post title.
    pub post_title: String,
    /// Post slug.
    pub post_slug: String,
    /// Vote value.
    pub value: VoteValue,
}

/// Body of `GET /users/{username}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Username as stored on posts and comments.
    pub username: String,
    /// Whether the server counts this user as a regular.
    #[serde(default)]
    pub is_regular: bool,
    /// Regulars get a short bio.
    #[serde(default)]
    pub bio: Option<String>,
    /// Posts, newest first.
    #[serde(default)]
    pub posts: Vec<PostSummary>,
    /// Comments, newest first.
    #[serde(default)]
    pub comments: Vec<UserComment>,
    /// Votes (regulars only).
    #[serde(default)]
    pub votes: Vec<UserVote>,
    /// Number of posts.
    #[serde(default)]
    pub post_count: u64,
    /// Number of comments.
    #[serde(default)]
    pub comment_count: u64,
}
