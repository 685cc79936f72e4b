//! Feed controller.
//!
//! Owns the feed query and the page currently on screen. Every query change
//! is a pure transition that returns a [`FeedRequest`] ticket; the ticket is
//! then run with [`FeedController::fetch`]. Each transition bumps the
//! generation, and a response is applied only while its ticket is still the
//! newest, so the displayed page always belongs to the last query issued.

use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, instrument, warn};
use vladfm_core::{FeedQuery, FeedSort, PostSummary};
use vladfm_fetch::{ApiGateway, GatewayError};

use crate::error::StoreError;
use crate::loading::{LoadingGuard, Tracked};

// ============================================================================
// State
// ============================================================================

/// Feed lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// A request for the current query is in flight.
    Loading,
    /// The current query's page is displayed.
    Loaded,
    /// The last request failed; the previous page is still displayed.
    Errored,
}

/// Observable feed state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedState {
    /// The most recently issued query.
    pub query: FeedQuery,
    /// Lifecycle status.
    pub status: FeedStatus,
    /// True while the current query is in flight.
    pub loading: bool,
    /// Posts on screen.
    pub posts: Vec<PostSummary>,
    /// Page count reported with `posts`. Never 0.
    pub total_pages: u32,
    /// Query that produced `posts`.
    pub loaded_query: Option<FeedQuery>,
    /// Message of the last failure, cleared on success.
    pub last_error: Option<String>,
    /// Generation of `query`.
    pub generation: u64,
}

impl FeedState {
    fn new(query: FeedQuery) -> Self {
        Self {
            query,
            status: FeedStatus::Idle,
            loading: false,
            posts: Vec::new(),
            total_pages: 1,
            loaded_query: None,
            last_error: None,
            generation: 0,
        }
    }

    /// Current page number.
    pub fn page(&self) -> u32 {
        self.query.page
    }

    /// Returns true if a later page exists.
    pub fn has_next(&self) -> bool {
        self.query.page < self.total_pages
    }

    /// Returns true if an earlier page exists.
    pub fn has_previous(&self) -> bool {
        self.query.page > 1
    }
}

impl Tracked for FeedState {
    fn generation(&self) -> u64 {
        self.generation
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn release(&mut self) {
        self.loading = false;
        if self.status == FeedStatus::Loading {
            self.status = if self.loaded_query.is_some() {
                FeedStatus::Loaded
            } else {
                FeedStatus::Idle
            };
        }
    }
}

/// Ticket for one feed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    /// Query to fetch.
    pub query: FeedQuery,
    /// Generation the query was issued at.
    pub generation: u64,
}

/// What happened to a fetched page.
#[derive(Debug, Clone)]
pub enum FeedOutcome {
    /// The page is now displayed.
    Loaded,
    /// The request failed; the previous page stays on screen.
    Failed(GatewayError),
    /// A newer query was issued; the response was discarded.
    Stale,
}

impl FeedOutcome {
    /// Converts a failure into an error. Stale responses are not errors.
    pub fn into_result(self) -> Result<(), StoreError> {
        match self {
            Self::Failed(e) => Err(e.into()),
            Self::Loaded | Self::Stale => Ok(()),
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Race-safe feed state machine. Clones share the same state.
#[derive(Clone)]
pub struct FeedController {
    gateway: Arc<dyn ApiGateway>,
    state: Arc<watch::Sender<FeedState>>,
    in_flight: Arc<Mutex<Option<AbortHandle>>>,
}

impl fmt::Debug for FeedController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedController")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl FeedController {
    /// Creates a controller on the default query (new, no tag, page 1).
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self::with_query(gateway, FeedQuery::default())
    }

    /// Creates a controller starting from `query`.
    pub fn with_query(gateway: Arc<dyn ApiGateway>, query: FeedQuery) -> Self {
        let (state, _) = watch::channel(FeedState::new(query));
        Self {
            gateway,
            state: Arc::new(state),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    /// The most recently issued query.
    pub fn query(&self) -> FeedQuery {
        self.state.borrow().query.clone()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Switches the sort mode and returns to page 1.
    pub fn sort_request(&self, sort: FeedSort) -> FeedRequest {
        self.issue(|q| q.with_sort(sort))
    }

    /// Switches the tag filter and returns to page 1.
    pub fn tag_request(&self, tag: Option<String>) -> FeedRequest {
        self.issue(|q| q.with_tag(tag))
    }

    /// Moves to another page, keeping sort and tag.
    ///
    /// # Errors
    ///
    /// Page 0 is rejected and nothing changes.
    pub fn page_request(&self, page: u32) -> Result<FeedRequest, StoreError> {
        Ok(self.try_issue(|q| q.with_page(page))?)
    }

    /// Reissues the current query.
    pub fn refresh_request(&self) -> FeedRequest {
        self.issue(|q| q)
    }

    fn issue(&self, change: impl FnOnce(FeedQuery) -> FeedQuery) -> FeedRequest {
        let Ok(request) = self.try_issue(|q| Ok::<_, Infallible>(change(q)));
        request
    }

    /// Applies a query change and stamps a new generation. A rejected
    /// change leaves the state untouched.
    fn try_issue<E>(
        &self,
        change: impl FnOnce(FeedQuery) -> Result<FeedQuery, E>,
    ) -> Result<FeedRequest, E> {
        let mut rejected = None;
        let mut request = FeedRequest {
            query: FeedQuery::default(),
            generation: 0,
        };
        self.state.send_if_modified(|s| {
            let query = match change(s.query.clone()) {
                Ok(query) => query,
                Err(e) => {
                    rejected = Some(e);
                    return false;
                }
            };
            // The superseded fetch no longer owns the flag. The new ticket's
            // fetch sets it again once it starts.
            if s.loading {
                s.release();
            }
            s.query = query;
            s.generation += 1;
            request = FeedRequest {
                query: s.query.clone(),
                generation: s.generation,
            };
            true
        });
        if let Some(e) = rejected {
            return Err(e);
        }
        debug!(
            sort = %request.query.sort,
            tag = ?request.query.tag,
            page = request.query.page,
            generation = request.generation,
            "Feed query issued"
        );
        Ok(request)
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Runs a ticket against the gateway.
    ///
    /// Failures are recorded in the state, not returned as errors.
    #[instrument(skip(self, request), fields(generation = request.generation))]
    pub async fn fetch(&self, request: FeedRequest) -> FeedOutcome {
        let FeedRequest { query, generation } = request;

        let started = self.apply_current(generation, |s| {
            s.loading = true;
            s.status = FeedStatus::Loading;
        });
        if !started {
            debug!("Feed query superseded before it started");
            return FeedOutcome::Stale;
        }
        let _guard = LoadingGuard::new(self.state.as_ref(), generation);

        let result = self
            .gateway
            .list_posts(query.sort, query.tag.as_deref(), query.page)
            .await;

        match result {
            Ok(page) => {
                let count = page.items.len();
                let total_pages = page.total_pages.max(1);
                let applied = self.apply_current(generation, |s| {
                    s.posts = page.items;
                    s.total_pages = total_pages;
                    s.loaded_query = Some(s.query.clone());
                    s.status = FeedStatus::Loaded;
                    s.loading = false;
                    s.last_error = None;
                });
                if applied {
                    info!(posts = count, pages = total_pages, "Feed loaded");
                    FeedOutcome::Loaded
                } else {
                    debug!("Discarding stale feed response");
                    FeedOutcome::Stale
                }
            }
            Err(e) => {
                let message = e.to_string();
                let applied = self.apply_current(generation, |s| {
                    s.status = FeedStatus::Errored;
                    s.loading = false;
                    s.last_error = Some(message);
                });
                if applied {
                    warn!(error = %e, "Feed fetch failed, keeping previous page");
                    FeedOutcome::Failed(e)
                } else {
                    debug!(error = %e, "Discarding stale feed failure");
                    FeedOutcome::Stale
                }
            }
        }
    }

    fn apply_current(&self, generation: u64, update: impl FnOnce(&mut FeedState)) -> bool {
        self.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            update(s);
            true
        })
    }

    /// Sets the sort mode and fetches.
    pub async fn set_sort(&self, sort: FeedSort) -> FeedOutcome {
        self.fetch(self.sort_request(sort)).await
    }

    /// Sets the tag filter and fetches.
    pub async fn set_tag(&self, tag: Option<String>) -> FeedOutcome {
        self.fetch(self.tag_request(tag)).await
    }

    /// Moves to a page and fetches.
    ///
    /// # Errors
    ///
    /// Page 0 is rejected before any request is made.
    pub async fn set_page(&self, page: u32) -> Result<FeedOutcome, StoreError> {
        let request = self.page_request(page)?;
        Ok(self.fetch(request).await)
    }

    /// Refetches the current query.
    pub async fn refresh(&self) -> FeedOutcome {
        self.fetch(self.refresh_request()).await
    }

    // ========================================================================
    // Spawned Fetching
    // ========================================================================

    /// Runs a ticket on a tokio task and aborts the task it supersedes.
    pub fn spawn_fetch(&self, request: FeedRequest) -> JoinHandle<FeedOutcome> {
        let controller = self.clone();
        let handle = tokio::spawn(async move { controller.fetch(request).await });

        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle.abort_handle());
        if let Some(previous) = previous {
            if !previous.is_finished() {
                debug!("Aborting superseded feed request");
                previous.abort();
            }
        }
        handle
    }

    /// Spawned [`FeedController::set_sort`].
    pub fn spawn_sort(&self, sort: FeedSort) -> JoinHandle<FeedOutcome> {
        self.spawn_fetch(self.sort_request(sort))
    }

    /// Spawned [`FeedController::set_tag`].
    pub fn spawn_tag(&self, tag: Option<String>) -> JoinHandle<FeedOutcome> {
        self.spawn_fetch(self.tag_request(tag))
    }

    /// Spawned [`FeedController::set_page`].
    ///
    /// # Errors
    ///
    /// Page 0 is rejected before anything is spawned.
    pub fn spawn_page(&self, page: u32) -> Result<JoinHandle<FeedOutcome>, StoreError> {
        Ok(self.spawn_fetch(self.page_request(page)?))
    }

    /// Spawned [`FeedController::refresh`].
    pub fn spawn_refresh(&self) -> JoinHandle<FeedOutcome> {
        self.spawn_fetch(self.refresh_request())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use tokio::sync::oneshot;
    use vladfm_core::{
        AuthorSummary, Comment, CoreError, FeedResult, Post, SiteStats, Tag, UserProfile, VoteState, VoteValue,
    };
    use vladfm_fetch::MemoryGateway;

    type Gate = oneshot::Sender<Result<FeedResult, GatewayError>>;

    /// Answers `list_posts` only when the test releases the matching gate.
    #[derive(Default)]
    struct GatedGateway {
        gates: std::sync::Mutex<HashMap<FeedSort, oneshot::Receiver<Result<FeedResult, GatewayError>>>>,
    }

    impl GatedGateway {
        fn gate(&self, sort: FeedSort) -> Gate {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(sort, rx);
            tx
        }
    }

    fn unused<T>() -> Result<T, GatewayError> {
        Err(GatewayError::not_found("unused in feed tests"))
    }

    #[async_trait]
    impl ApiGateway for GatedGateway {
        async fn list_posts(
            &self,
            sort: FeedSort,
            _tag: Option<&str>,
            _page: u32,
        ) -> Result<FeedResult, GatewayError> {
            let rx = self.gates.lock().unwrap().remove(&sort);
            match rx {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(GatewayError::Network("gate dropped".into()))),
                None => Err(GatewayError::Network("no gate".into())),
            }
        }

        async fn get_post(&self, _slug: &str) -> Result<Post, GatewayError> {
            unused()
        }

        async fn list_comments(&self, _post_id: u64) -> Result<Vec<Comment>, GatewayError> {
            unused()
        }

        async fn add_comment(&self, _: u64, _: &str, _: &str) -> Result<Comment, GatewayError> {
            unused()
        }

        async fn cast_vote(&self, _: u64, _: &str, _: VoteValue) -> Result<VoteState, GatewayError> {
            unused()
        }

        async fn get_vote(&self, _: u64, _: &str) -> Result<Option<VoteState>, GatewayError> {
            unused()
        }

        async fn list_tags(&self) -> Result<Vec<Tag>, GatewayError> {
            unused()
        }

        async fn get_stats(&self) -> Result<SiteStats, GatewayError> {
            unused()
        }

        async fn list_regulars(&self) -> Result<Vec<AuthorSummary>, GatewayError> {
            unused()
        }

        async fn get_user_profile(&self, _: &str) -> Result<UserProfile, GatewayError> {
            unused()
        }
    }

    fn summary(id: u64, title: &str) -> PostSummary {
        PostSummary {
            id,
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            author_name: "leo".to_string(),
            is_true_story: false,
            truth_score: 0,
            created_at: Utc::now(),
            tags: Vec::new(),
            score: 0,
            comment_count: 0,
        }
    }

    fn page_of(titles: &[&str], pages: u32) -> FeedResult {
        let items = titles
            .iter()
            .zip(1u64..)
            .map(|(title, id)| summary(id, title))
            .collect();
        FeedResult::new(items, pages)
    }

    fn gated() -> (Arc<GatedGateway>, FeedController) {
        let gateway = Arc::new(GatedGateway::default());
        let feed = FeedController::new(gateway.clone());
        (gateway, feed)
    }

    #[test]
    fn test_initial_state() {
        let (_, feed) = gated();
        let state = feed.state();
        assert_eq!(state.status, FeedStatus::Idle);
        assert!(!state.loading);
        assert_eq!(state.query, FeedQuery::default());
        assert_eq!(state.total_pages, 1);
    }

    #[tokio::test]
    async fn test_sort_and_tag_reset_page() {
        let (_, feed) = gated();

        feed.page_request(3).unwrap();
        assert_eq!(feed.sort_request(FeedSort::Top).query.page, 1);

        feed.page_request(4).unwrap();
        let request = feed.tag_request(Some("x".into()));
        assert_eq!(request.query.page, 1);
        assert_eq!(request.query.tag.as_deref(), Some("x"));
        assert_eq!(request.query.sort, FeedSort::Top);
    }

    #[tokio::test]
    async fn test_page_change_keeps_sort_and_tag() {
        let (_, feed) = gated();
        feed.sort_request(FeedSort::Discussed);
        feed.tag_request(Some("transfers".into()));

        let request = feed.page_request(2).unwrap();
        assert_eq!(request.query.sort, FeedSort::Discussed);
        assert_eq!(request.query.tag.as_deref(), Some("transfers"));
        assert_eq!(request.query.page, 2);
    }

    #[tokio::test]
    async fn test_page_zero_rejected_without_change() {
        let (_, feed) = gated();
        let before = feed.state();

        let err = feed.page_request(0).unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::InvalidPage(0))));
        assert_eq!(feed.state(), before);
    }

    #[tokio::test]
    async fn test_end_to_end_first_page() {
        let (gateway, feed) = gated();
        gateway
            .gate(FeedSort::New)
            .send(Ok(page_of(&["One", "Two", "Three"], 5)))
            .unwrap();

        let outcome = feed.refresh().await;
        assert!(matches!(outcome, FeedOutcome::Loaded));

        let state = feed.state();
        assert!(!state.loading);
        assert_eq!(state.status, FeedStatus::Loaded);
        assert_eq!(state.posts.len(), 3);
        assert_eq!(state.total_pages, 5);
        assert_eq!(state.page(), 1);
        assert!(state.has_next());
        assert!(!state.has_previous());
    }

    #[tokio::test]
    async fn test_late_older_response_is_discarded() {
        let (gateway, feed) = gated();
        let new_gate = gateway.gate(FeedSort::New);
        let top_gate = gateway.gate(FeedSort::Top);

        let new_request = feed.sort_request(FeedSort::New);
        let c = feed.clone();
        let new_task = tokio::spawn(async move { c.fetch(new_request).await });
        tokio::task::yield_now().await;

        let top_request = feed.sort_request(FeedSort::Top);
        let c = feed.clone();
        let top_task = tokio::spawn(async move { c.fetch(top_request).await });
        tokio::task::yield_now().await;

        top_gate.send(Ok(page_of(&["Top post"], 1))).unwrap();
        assert!(matches!(top_task.await.unwrap(), FeedOutcome::Loaded));

        new_gate.send(Ok(page_of(&["New A", "New B"], 2))).unwrap();
        assert!(matches!(new_task.await.unwrap(), FeedOutcome::Stale));

        let state = feed.state();
        assert_eq!(state.loaded_query.unwrap().sort, FeedSort::Top);
        assert_eq!(state.posts.len(), 1);
        assert_eq!(state.posts[0].title, "Top post");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_early_older_response_is_discarded() {
        let (gateway, feed) = gated();
        let new_gate = gateway.gate(FeedSort::New);
        let top_gate = gateway.gate(FeedSort::Top);

        let new_request = feed.sort_request(FeedSort::New);
        let c = feed.clone();
        let new_task = tokio::spawn(async move { c.fetch(new_request).await });
        tokio::task::yield_now().await;

        let top_request = feed.sort_request(FeedSort::Top);
        let c = feed.clone();
        let top_task = tokio::spawn(async move { c.fetch(top_request).await });
        tokio::task::yield_now().await;

        new_gate.send(Ok(page_of(&["New A", "New B"], 2))).unwrap();
        assert!(matches!(new_task.await.unwrap(), FeedOutcome::Stale));
        assert!(feed.state().loading, "top request is still in flight");

        top_gate.send(Ok(page_of(&["Top post"], 1))).unwrap();
        assert!(matches!(top_task.await.unwrap(), FeedOutcome::Loaded));

        let state = feed.state();
        assert_eq!(state.loaded_query.unwrap().sort, FeedSort::Top);
        assert_eq!(state.posts[0].title, "Top post");
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_page() {
        let gateway = MemoryGateway::with_demo_data();
        let feed = FeedController::new(Arc::new(gateway.clone()));

        assert!(matches!(feed.refresh().await, FeedOutcome::Loaded));
        let loaded = feed.state().posts;
        assert!(!loaded.is_empty());

        gateway.set_failure(Some(GatewayError::Network("connection refused".into())));
        let outcome = feed.set_sort(FeedSort::Top).await;
        assert!(matches!(outcome, FeedOutcome::Failed(ref e) if e.is_network()));

        let state = feed.state();
        assert_eq!(state.status, FeedStatus::Errored);
        assert!(!state.loading);
        assert_eq!(state.posts, loaded);
        assert!(state.last_error.is_some());
        assert_eq!(state.query.sort, FeedSort::Top);
    }

    #[tokio::test]
    async fn test_spawned_fetch_aborts_superseded_task() {
        let (gateway, feed) = gated();
        let _new_gate = gateway.gate(FeedSort::New);
        let top_gate = gateway.gate(FeedSort::Top);

        let first = feed.spawn_sort(FeedSort::New);
        tokio::task::yield_now().await;
        let second = feed.spawn_sort(FeedSort::Top);

        assert!(first.await.unwrap_err().is_cancelled());

        top_gate.send(Ok(page_of(&["Top post"], 1))).unwrap();
        assert!(matches!(second.await.unwrap(), FeedOutcome::Loaded));
        assert_eq!(feed.state().loaded_query.unwrap().sort, FeedSort::Top);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_clears_loading() {
        let (gateway, feed) = gated();
        let _gate = gateway.gate(FeedSort::New);

        let task = feed.spawn_refresh();
        tokio::task::yield_now().await;
        assert!(feed.state().loading);

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        let state = feed.state();
        assert!(!state.loading);
        assert_eq!(state.status, FeedStatus::Idle);
    }

    #[tokio::test]
    async fn test_aborted_successor_leaves_loading_clear() {
        let (gateway, feed) = gated();
        let _new_gate = gateway.gate(FeedSort::New);

        let older = feed.spawn_refresh();
        tokio::task::yield_now().await;
        assert!(feed.state().loading);

        // Superseded and then cancelled before its first poll.
        let newer = feed.spawn_sort(FeedSort::Top);
        newer.abort();

        assert!(older.await.unwrap_err().is_cancelled());
        assert!(newer.await.unwrap_err().is_cancelled());

        let state = feed.state();
        assert!(!state.loading);
        assert_eq!(state.status, FeedStatus::Idle);
    }

    #[tokio::test]
    async fn test_unrun_transition_releases_loading() {
        let (gateway, feed) = gated();
        let new_gate = gateway.gate(FeedSort::New);

        let c = feed.clone();
        let request = feed.refresh_request();
        let older = tokio::spawn(async move { c.fetch(request).await });
        tokio::task::yield_now().await;
        assert!(feed.state().loading);

        feed.sort_request(FeedSort::Top);
        let state = feed.state();
        assert!(!state.loading);
        assert_eq!(state.status, FeedStatus::Idle);

        new_gate.send(Ok(page_of(&["Late"], 1))).unwrap();
        assert!(matches!(older.await.unwrap(), FeedOutcome::Stale));
        assert!(!feed.state().loading);
        assert!(feed.state().posts.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_loaded_state() {
        let gateway = MemoryGateway::with_demo_data();
        let feed = FeedController::new(Arc::new(gateway));
        let mut rx = feed.subscribe();

        feed.refresh().await;

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.status, FeedStatus::Loaded);
    }
}
