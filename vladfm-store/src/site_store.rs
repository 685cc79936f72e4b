//! Site-wide data: tags, statistics and the regulars list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, watch};
use tracing::{debug, warn};
use vladfm_core::{AuthorSummary, SiteStats, Tag};
use vladfm_fetch::ApiGateway;

use crate::error::StoreError;

/// Snapshot of everything the site store holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteSnapshot {
    /// Tags, alphabetical.
    pub tags: Vec<Tag>,
    /// Site statistics.
    pub stats: Option<SiteStats>,
    /// Regulars, most comments first.
    pub regulars: Vec<AuthorSummary>,
    /// When any slot was last replaced.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Holds site-wide slots. Each refresh replaces its slot on success and
/// leaves it untouched on failure.
#[derive(Clone)]
pub struct SiteStore {
    gateway: Arc<dyn ApiGateway>,
    inner: Arc<RwLock<SiteSnapshot>>,
    notify: Arc<watch::Sender<u64>>,
    version: Arc<RwLock<u64>>,
}

impl std::fmt::Debug for SiteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteStore").finish_non_exhaustive()
    }
}

impl SiteStore {
    /// Creates an empty store.
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            gateway,
            inner: Arc::new(RwLock::new(SiteSnapshot::default())),
            notify: Arc::new(notify),
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Subscribes to change notifications. The value is a change counter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Full snapshot.
    pub async fn snapshot(&self) -> SiteSnapshot {
        self.inner.read().await.clone()
    }

    /// Tags.
    pub async fn tags(&self) -> Vec<Tag> {
        self.inner.read().await.tags.clone()
    }

    /// Statistics, if loaded.
    pub async fn stats(&self) -> Option<SiteStats> {
        self.inner.read().await.stats.clone()
    }

    /// Regulars.
    pub async fn regulars(&self) -> Vec<AuthorSummary> {
        self.inner.read().await.regulars.clone()
    }

    /// Looks up a tag by slug.
    pub async fn tag(&self, slug: &str) -> Option<Tag> {
        self.inner
            .read()
            .await
            .tags
            .iter()
            .find(|t| t.slug == slug)
            .cloned()
    }

    // ========================================================================
    // Refreshes
    // ========================================================================

    /// Reloads tags.
    pub async fn refresh_tags(&self) -> Result<Vec<Tag>, StoreError> {
        let tags = self.gateway.list_tags().await.inspect_err(|e| {
            warn!(error = %e, "Failed to load tags");
        })?;
        debug!(count = tags.len(), "Tags loaded");

        self.replace(|s| s.tags = tags.clone()).await;
        Ok(tags)
    }

    /// Reloads statistics.
    pub async fn refresh_stats(&self) -> Result<SiteStats, StoreError> {
        let stats = self.gateway.get_stats().await.inspect_err(|e| {
            warn!(error = %e, "Failed to load stats");
        })?;
        debug!(posts = stats.total_posts, "Stats loaded");

        self.replace(|s| s.stats = Some(stats.clone())).await;
        Ok(stats)
    }

    /// Reloads the regulars list.
    pub async fn refresh_regulars(&self) -> Result<Vec<AuthorSummary>, StoreError> {
        let regulars = self.gateway.list_regulars().await.inspect_err(|e| {
            warn!(error = %e, "Failed to load regulars");
        })?;
        debug!(count = regulars.len(), "Regulars loaded");

        self.replace(|s| s.regulars = regulars.clone()).await;
        Ok(regulars)
    }

    /// Reloads every slot, collecting failures instead of stopping at the
    /// first one.
    pub async fn refresh_all(&self) -> Vec<StoreError> {
        let (tags, stats, regulars) = tokio::join!(
            self.refresh_tags(),
            self.refresh_stats(),
            self.refresh_regulars()
        );
        [tags.err(), stats.err(), regulars.err()]
            .into_iter()
            .flatten()
            .collect()
    }

    async fn replace(&self, update: impl FnOnce(&mut SiteSnapshot)) {
        {
            let mut inner = self.inner.write().await;
            update(&mut inner);
            inner.updated_at = Some(Utc::now());
        }
        self.notify_change().await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use vladfm_fetch::{GatewayError, MemoryGateway};

    #[tokio::test]
    async fn test_refresh_fills_slots() {
        let gateway = MemoryGateway::with_demo_data();
        let store = SiteStore::new(Arc::new(gateway));

        assert!(store.refresh_all().await.is_empty());

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.tags.len(), 3);
        assert_eq!(snapshot.stats.unwrap().total_posts, 3);
        assert!(!snapshot.regulars.is_empty());
        assert!(snapshot.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_failure_leaves_slot_untouched() {
        let gateway = MemoryGateway::with_demo_data();
        let store = SiteStore::new(Arc::new(gateway.clone()));
        let tags = store.refresh_tags().await.unwrap();

        gateway.set_failure(Some(GatewayError::Network("offline".into())));
        assert!(store.refresh_tags().await.is_err());
        assert_eq!(store.tags().await, tags);

        let errors = store.refresh_all().await;
        assert_eq!(errors.len(), 3);
        assert!(store.stats().await.is_none());
    }

    #[tokio::test]
    async fn test_tag_lookup() {
        let gateway = MemoryGateway::with_demo_data();
        let store = SiteStore::new(Arc::new(gateway));
        store.refresh_tags().await.unwrap();

        let tag = store.tag("transfers").await.unwrap();
        assert_eq!(tag.name, "Transfers");
        assert!(store.tag("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_notified() {
        let store = SiteStore::new(Arc::new(MemoryGateway::with_demo_data()));
        let mut rx = store.subscribe();

        store.refresh_stats().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);
    }
}
