//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use vladfm_core::{AuthorSummary, Comment, Post, PostSummary, VoteState, author_link, is_regular};
use vladfm_store::{FeedState, FeedStatus};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a feed page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedOutput {
    pub sort: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub page: u32,
    pub total_pages: u32,
    pub posts: Vec<PostOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A post as listed in the feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostOutput {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub author: String,
    pub author_link: String,
    pub score: i64,
    pub comment_count: u64,
    pub truth_score: i32,
    pub true_story: bool,
    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

/// A full post with comments and the local vote.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailOutput {
    #[serde(flatten)]
    pub post: PostOutput,
    pub content: String,
    pub your_vote: i64,
    pub comments: Vec<CommentOutput>,
}

/// A comment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentOutput {
    pub id: u64,
    pub post_id: u64,
    pub author: String,
    pub content: String,
    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,
}

/// A confirmed vote.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutput {
    pub post_id: u64,
    pub value: i64,
    pub score: i64,
    pub truth_score: i32,
}

/// A regular with a profile link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularOutput {
    pub name: String,
    pub comments: u64,
    pub link: String,
}

/// A resolved author link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkOutput {
    pub name: String,
    pub regular: bool,
    pub link: String,
}

/// The local fingerprint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityOutput {
    pub fingerprint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_in: Option<String>,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }

    /// Converts a feed state.
    pub fn feed_output(&self, state: &FeedState) -> FeedOutput {
        FeedOutput {
            sort: state.query.sort.to_string(),
            tag: state.query.tag.clone(),
            page: state.page(),
            total_pages: state.total_pages,
            posts: state.posts.iter().map(|p| self.post_output(p)).collect(),
            error: (state.status == FeedStatus::Errored)
                .then(|| state.last_error.clone())
                .flatten(),
        }
    }

    /// Converts a feed entry.
    pub fn post_output(&self, post: &PostSummary) -> PostOutput {
        PostOutput {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            author: post.author_name.clone(),
            author_link: author_link(&post.author_name),
            score: post.score,
            comment_count: post.comment_count,
            truth_score: post.truth_score,
            true_story: post.is_true_story,
            created_at: post.created_at,
            tags: post.tags.iter().map(|t| t.slug.clone()).collect(),
        }
    }

    /// Converts a full post.
    pub fn post_detail_output(
        &self,
        post: &Post,
        comments: &[Comment],
        vote: Option<&VoteState>,
    ) -> PostDetailOutput {
        PostDetailOutput {
            post: self.post_output(&post.summary),
            content: post.content.clone(),
            your_vote: vote.map_or(0, |v| v.value.as_i64()),
            comments: comments.iter().map(|c| self.comment_output(c)).collect(),
        }
    }

    /// Converts a comment.
    pub fn comment_output(&self, comment: &Comment) -> CommentOutput {
        CommentOutput {
            id: comment.id,
            post_id: comment.post_id,
            author: comment.author_name.clone(),
            content: comment.content.clone(),
            created_at: comment.created_at,
        }
    }

    /// Converts a vote.
    pub fn vote_output(&self, vote: &VoteState) -> VoteOutput {
        VoteOutput {
            post_id: vote.post_id,
            value: vote.value.as_i64(),
            score: vote.score,
            truth_score: vote.truth_score,
        }
    }

    /// Converts the regulars list.
    pub fn regular_outputs(&self, regulars: &[AuthorSummary]) -> Vec<RegularOutput> {
        regulars
            .iter()
            .map(|r| RegularOutput {
                name: r.name.clone(),
                comments: r.comments,
                link: author_link(&r.name),
            })
            .collect()
    }

    /// Converts a resolved author link.
    pub fn link_output(&self, name: &str) -> LinkOutput {
        LinkOutput {
            name: name.to_string(),
            regular: is_regular(name),
            link: author_link(name),
        }
    }
}

// ============================================================================
// Serialization helpers
// ============================================================================

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_link_output() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.link_output("leo");
        assert!(output.regular);
        assert_eq!(output.link, author_link("leo"));
    }
}
