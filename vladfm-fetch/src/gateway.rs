//! The API gateway contract.
//!
//! Every store talks to the backend through [`ApiGateway`] only. Two
//! implementations ship with this crate: [`crate::HttpGateway`] for the real
//! backend and [`crate::MemoryGateway`] for tests and offline use.

use async_trait::async_trait;
use vladfm_core::{
    AuthorSummary, Comment, FeedResult, FeedSort, Post, SiteStats, Tag, UserProfile, VoteState,
    VoteValue,
};

use crate::error::GatewayError;

/// Typed façade over the `/api` endpoints.
///
/// Implementations perform no retries. Only [`ApiGateway::add_comment`] and
/// [`ApiGateway::cast_vote`] have side effects.
///
/// ## Implementing a Gateway
///
/// ```ignore
/// struct Recorded(Vec<Post>);
///
/// #[async_trait]
/// impl ApiGateway for Recorded {
///     async fn get_post(&self, slug: &str) -> Result<Post, GatewayError> {
///         self.0
///             .iter()
///             .find(|p| p.slug() == slug)
///             .cloned()
///             .ok_or_else(|| GatewayError::not_found("post not found"))
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// `GET /posts?sort&page[&tag]`
    async fn list_posts(
        &self,
        sort: FeedSort,
        tag: Option<&str>,
        page: u32,
    ) -> Result<FeedResult, GatewayError>;

    /// `GET /posts/{slug}`
    async fn get_post(&self, slug: &str) -> Result<Post, GatewayError>;

    /// `GET /posts/{id}/comments`, oldest first.
    async fn list_comments(&self, post_id: u64) -> Result<Vec<Comment>, GatewayError>;

    /// `POST /posts/{id}/comments`. The server assigns id and timestamp.
    async fn add_comment(
        &self,
        post_id: u64,
        author_name: &str,
        content: &str,
    ) -> Result<Comment, GatewayError>;

    /// `POST /posts/{id}/vote`. [`VoteValue::None`] retracts.
    async fn cast_vote(
        &self,
        post_id: u64,
        identity: &str,
        value: VoteValue,
    ) -> Result<VoteState, GatewayError>;

    /// `GET /posts/{id}/vote?fingerprint`
    async fn get_vote(&self, post_id: u64, identity: &str) -> Result<Option<VoteState>, GatewayError>;

    /// `GET /tags`
    async fn list_tags(&self) -> Result<Vec<Tag>, GatewayError>;

    /// `GET /stats`
    async fn get_stats(&self) -> Result<SiteStats, GatewayError>;

    /// `GET /regulars`
    async fn list_regulars(&self) -> Result<Vec<AuthorSummary>, GatewayError>;

    /// `GET /users/{username}`. Unknown users fail with a 404.
    async fn get_user_profile(&self, username: &str) -> Result<UserProfile, GatewayError>;
}
