//! HTTP-backed gateway.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};
use vladfm_core::{
    AuthorSummary, Comment, FeedQuery, FeedResult, FeedSort, Post, SiteStats, Tag, UserProfile,
    VoteState, VoteTally, VoteValue,
};

use crate::client::HttpClient;
use crate::error::GatewayError;
use crate::gateway::ApiGateway;
use crate::settings::GatewaySettings;

// ============================================================================
// Request Bodies
// ============================================================================

#[derive(Debug, Serialize)]
struct CommentBody<'a> {
    author_name: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct VoteBody<'a> {
    fingerprint: &'a str,
    value: VoteValue,
}

// ============================================================================
// HTTP Gateway
// ============================================================================

/// Gateway to the real backend.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: HttpClient,
}

impl HttpGateway {
    /// Creates a gateway from settings.
    ///
    /// # Errors
    ///
    /// Fails if the base URL is unusable.
    pub fn new(settings: &GatewaySettings) -> Result<Self, GatewayError> {
        Ok(Self {
            client: HttpClient::new(settings)?,
        })
    }
}

#[async_trait]
impl ApiGateway for HttpGateway {
    #[instrument(skip(self))]
    async fn list_posts(
        &self,
        sort: FeedSort,
        tag: Option<&str>,
        page: u32,
    ) -> Result<FeedResult, GatewayError> {
        let query = FeedQuery {
            sort,
            tag: tag.map(str::to_string),
            page,
        };
        let url = self.client.endpoint(&["posts"])?;
        let result: FeedResult = self.client.get_json(url, &query.to_params()).await?;
        debug!(items = result.items.len(), pages = result.total_pages, "Feed page received");
        Ok(result.normalized())
    }

    #[instrument(skip(self))]
    async fn get_post(&self, slug: &str) -> Result<Post, GatewayError> {
        let url = self.client.endpoint(&["posts", slug])?;
        self.client.get_json(url, &[]).await
    }

    #[instrument(skip(self))]
    async fn list_comments(&self, post_id: u64) -> Result<Vec<Comment>, GatewayError> {
        let id = post_id.to_string();
        let url = self.client.endpoint(&["posts", &id, "comments"])?;
        self.client.get_json(url, &[]).await
    }

    #[instrument(skip(self, content))]
    async fn add_comment(
        &self,
        post_id: u64,
        author_name: &str,
        content: &str,
    ) -> Result<Comment, GatewayError> {
        let id = post_id.to_string();
        let url = self.client.endpoint(&["posts", &id, "comments"])?;
        let body = CommentBody {
            author_name,
            content,
        };
        self.client.post_json(url, &body).await
    }

    #[instrument(skip(self, identity))]
    async fn cast_vote(
        &self,
        post_id: u64,
        identity: &str,
        value: VoteValue,
    ) -> Result<VoteState, GatewayError> {
        let id = post_id.to_string();
        let url = self.client.endpoint(&["posts", &id, "vote"])?;
        let body = VoteBody {
            fingerprint: identity,
            value,
        };
        let tally: VoteTally = self.client.post_json(url, &body).await?;
        Ok(VoteState::from_tally(post_id, identity, tally))
    }

    #[instrument(skip(self, identity))]
    async fn get_vote(&self, post_id: u64, identity: &str) -> Result<Option<VoteState>, GatewayError> {
        let id = post_id.to_string();
        let url = self.client.endpoint(&["posts", &id, "vote"])?;
        let tally: Option<VoteTally> = self
            .client
            .get_json(url, &[("fingerprint", identity.to_string())])
            .await?;
        Ok(tally.map(|t| VoteState::from_tally(post_id, identity, t)))
    }

    #[instrument(skip(self))]
    async fn list_tags(&self) -> Result<Vec<Tag>, GatewayError> {
        let url = self.client.endpoint(&["tags"])?;
        self.client.get_json(url, &[]).await
    }

    #[instrument(skip(self))]
    async fn get_stats(&self) -> Result<SiteStats, GatewayError> {
        let url = self.client.endpoint(&["stats"])?;
        self.client.get_json(url, &[]).await
    }

    #[instrument(skip(self))]
    async fn list_regulars(&self) -> Result<Vec<AuthorSummary>, GatewayError> {
        let url = self.client.endpoint(&["regulars"])?;
        self.client.get_json(url, &[]).await
    }

    #[instrument(skip(self))]
    async fn get_user_profile(&self, username: &str) -> Result<UserProfile, GatewayError> {
        let url = self.client.endpoint(&["users", username])?;
        self.client.get_json(url, &[]).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_body_shape() {
        let body = VoteBody {
            fingerprint: "1x9k2",
            value: VoteValue::Down,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"fingerprint": "1x9k2", "value": -1})
        );
    }

    #[test]
    fn test_comment_body_shape() {
        let body = CommentBody {
            author_name: "kris",
            content: "Pedri!",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"author_name": "kris", "content": "Pedri!"})
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Port 9 (discard) on localhost is closed on CI machines.
        let settings = GatewaySettings::new("http://127.0.0.1:9/api")
            .with_timeout(std::time::Duration::from_secs(2));
        let gateway = HttpGateway::new(&settings).unwrap();

        let err = gateway.list_tags().await.unwrap_err();
        assert!(err.is_network(), "unexpected error: {err:?}");
    }
}
