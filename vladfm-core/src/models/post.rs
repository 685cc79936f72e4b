//! Post-related types.
//!
//! - [`Tag`] - Topic tag attached to posts
//! - [`PostSummary`] - Feed listing entry
//! - [`Post`] - Full post including content
//! - [`Comment`] - Comment on a post

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use crate::error::CoreError;

// ============================================================================
// Tag
// ============================================================================

/// Topic tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Server id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// URL slug, used as the feed filter value.
    pub slug: String,
    /// Hex color (`#rrggbb`).
    #[serde(default = "default_tag_color")]
    pub color: String,
}

fn default_tag_color() -> String {
    "#666666".to_string()
}

// ============================================================================
// Posts
// ============================================================================

/// Feed listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Server id, used for comment and vote endpoints.
    pub id: u64,
    /// Title.
    pub title: String,
    /// URL slug, used to open the post.
    pub slug: String,
    /// Author display name.
    pub author_name: String,
    /// Whether the post is marked as a true story.
    #[serde(default)]
    pub is_true_story: bool,
    /// Crowd truth score, 0 to 100.
    #[serde(default)]
    pub truth_score: i32,
    /// Creation time.
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Sum of all votes.
    #[serde(default)]
    pub score: i64,
    /// Number of comments.
    #[serde(default)]
    pub comment_count: u64,
}

impl PostSummary {
    /// Returns true if the post carries the tag with the given slug.
    pub fn has_tag(&self, slug: &str) -> bool {
        self.tags.iter().any(|t| t.slug == slug)
    }

    /// Validates server-supplied values.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` if the truth score is outside 0..=100.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0..=100).contains(&self.truth_score) {
            return Err(CoreError::InvalidData(format!(
                "post {}: truth score {} out of range",
                self.slug, self.truth_score
            )));
        }
        Ok(())
    }
}

/// Full post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Listing fields.
    #[serde(flatten)]
    pub summary: PostSummary,
    /// Body text.
    pub content: String,
}

impl Post {
    /// Server id.
    pub fn id(&self) -> u64 {
        self.summary.id
    }

    /// URL slug.
    pub fn slug(&self) -> &str {
        &self.summary.slug
    }
}

// ============================================================================
// Comment
// ============================================================================

/// Comment on a post. The server assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
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
}
