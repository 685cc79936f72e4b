//! Application state.
//!
//! One [`AppState`] is built per process and handed to every consumer.
//! Clones share the same stores.

use std::sync::Arc;

use tracing::debug;
use vladfm_fetch::{ApiGateway, HttpGateway};

use crate::config::ClientConfig;
use crate::error::StoreError;
use crate::feed::FeedController;
use crate::identity::{IdentityProvider, IdentityStorage};
use crate::post_store::PostStore;
use crate::site_store::SiteStore;
use crate::votes::VoteCoordinator;

/// Every store of a running client.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<ClientConfig>,
    identity: Arc<IdentityProvider>,
    /// Feed controller.
    pub feed: FeedController,
    /// Vote coordinator.
    pub votes: VoteCoordinator,
    /// Open post.
    pub post: PostStore,
    /// Tags, stats and regulars.
    pub site: SiteStore,
}

impl AppState {
    /// Wires the stores to a gateway and an identity source.
    pub fn new(
        config: ClientConfig,
        gateway: Arc<dyn ApiGateway>,
        identity_storage: Arc<dyn IdentityStorage>,
    ) -> Self {
        let identity = Arc::new(IdentityProvider::from_env(identity_storage));
        let feed = FeedController::with_query(
            Arc::clone(&gateway),
            vladfm_core::FeedQuery::new(config.default_sort),
        );

        debug!(base_url = %config.base_url, sort = %config.default_sort, "Building client state");
        Self {
            config: Arc::new(config),
            feed,
            votes: VoteCoordinator::new(Arc::clone(&gateway), Arc::clone(&identity)),
            post: PostStore::new(Arc::clone(&gateway)),
            site: SiteStore::new(gateway),
            identity,
        }
    }

    /// Wires the stores to the HTTP backend named in `config`.
    ///
    /// # Errors
    ///
    /// Fails if the configured base URL is unusable.
    pub fn connect(
        config: ClientConfig,
        identity_storage: Arc<dyn IdentityStorage>,
    ) -> Result<Self, StoreError> {
        let gateway = HttpGateway::new(&config.gateway_settings())?;
        Ok(Self::new(config, Arc::new(gateway), identity_storage))
    }

    /// Configuration the stores were built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Identity provider shared by the stores.
    pub fn identity(&self) -> &IdentityProvider {
        &self.identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemoryIdentityStorage;
    use vladfm_core::{FeedSort, VoteValue};
    use vladfm_fetch::MemoryGateway;

    fn offline(config: ClientConfig) -> AppState {
        AppState::new(
            config,
            Arc::new(MemoryGateway::with_demo_data()),
            Arc::new(MemoryIdentityStorage::new()),
        )
    }

    #[tokio::test]
    async fn test_feed_opens_with_configured_sort() {
        let state = offline(ClientConfig {
            default_sort: FeedSort::Discussed,
            ..Default::default()
        });
        assert_eq!(state.feed.query().sort, FeedSort::Discussed);
        assert_eq!(state.config().default_sort, FeedSort::Discussed);

        state.feed.refresh().await.into_result().unwrap();
        assert_eq!(state.feed.state().posts.len(), 3);
    }

    #[tokio::test]
    async fn test_votes_use_shared_identity() {
        let state = offline(ClientConfig::default());
        let vote = state.votes.cast_vote(1, VoteValue::Up).await.unwrap();
        assert_eq!(vote.identity, state.identity().identity().as_str());
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        let config = ClientConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        let result = AppState::connect(config, Arc::new(MemoryIdentityStorage::new()));
        assert!(matches!(result, Err(StoreError::Gateway(_))));
    }

    #[tokio::test]
    async fn test_clones_share_stores() {
        let state = offline(ClientConfig::default());
        let clone = state.clone();

        clone.feed.refresh().await;
        assert_eq!(state.feed.state().status, crate::feed::FeedStatus::Loaded);
    }
}
