//! The open post and its comment thread.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use vladfm_core::{Comment, CoreError, Post};
use vladfm_fetch::ApiGateway;

use crate::error::StoreError;
use crate::loading::{LoadingGuard, Tracked};

/// Author name used when a comment is left unsigned.
pub const ANONYMOUS: &str = "anonymous";

/// Longest author name the backend stores.
pub const MAX_AUTHOR_LEN: usize = 100;

/// Observable post state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostState {
    /// Slug most recently requested.
    pub slug: Option<String>,
    /// Post on screen.
    pub post: Option<Post>,
    /// Its comments, oldest first.
    pub comments: Vec<Comment>,
    /// True while the requested post is loading.
    pub loading: bool,
    /// Message of the last failure.
    pub last_error: Option<String>,
    /// Generation of `slug`.
    pub generation: u64,
}

impl Tracked for PostState {
    fn generation(&self) -> u64 {
        self.generation
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn release(&mut self) {
        self.loading = false;
    }
}

/// Loads posts and posts comments. Clones share the same state.
#[derive(Clone)]
pub struct PostStore {
    gateway: Arc<dyn ApiGateway>,
    state: Arc<watch::Sender<PostState>>,
}

impl std::fmt::Debug for PostStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl PostStore {
    /// Creates an empty store.
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        let (state, _) = watch::channel(PostState::default());
        Self {
            gateway,
            state: Arc::new(state),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PostState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<PostState> {
        self.state.subscribe()
    }

    /// The post on screen.
    pub fn post(&self) -> Option<Post> {
        self.state.borrow().post.clone()
    }

    /// Fetches a post and then its comments.
    ///
    /// A response for a slug that has since been replaced is returned but
    /// not displayed. On failure the previous post stays on screen.
    #[instrument(skip(self))]
    pub async fn open(&self, slug: &str) -> Result<Post, StoreError> {
        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            s.slug = Some(slug.to_string());
            s.loading = true;
            generation = s.generation;
        });
        let _guard = LoadingGuard::new(self.state.as_ref(), generation);

        let loaded = self.load(slug).await;

        self.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            s.loading = false;
            match &loaded {
                Ok((post, comments)) => {
                    s.post = Some(post.clone());
                    s.comments = comments.clone();
                    s.last_error = None;
                }
                Err(e) => s.last_error = Some(e.to_string()),
            }
            true
        });

        match loaded {
            Ok((post, comments)) => {
                info!(id = post.id(), comments = comments.len(), "Post opened");
                Ok(post)
            }
            Err(e) => {
                warn!(error = %e, "Opening post failed");
                Err(e)
            }
        }
    }

    async fn load(&self, slug: &str) -> Result<(Post, Vec<Comment>), StoreError> {
        let post = self.gateway.get_post(slug).await?;
        let comments = self.gateway.list_comments(post.id()).await?;
        Ok((post, comments))
    }

    /// Refetches the comments of the post on screen.
    pub async fn refresh_comments(&self) -> Result<Vec<Comment>, StoreError> {
        let post_id = self.open_post_id()?;
        let comments = self.gateway.list_comments(post_id).await?;

        self.state.send_if_modified(|s| {
            if s.post.as_ref().map(Post::id) != Some(post_id) {
                return false;
            }
            s.comments = comments.clone();
            true
        });
        Ok(comments)
    }

    /// Posts a comment on the open post and appends the server's copy.
    ///
    /// Content is trimmed and must not be empty. A blank author becomes
    /// [`ANONYMOUS`].
    #[instrument(skip(self, content))]
    pub async fn add_comment(&self, author: &str, content: &str) -> Result<Comment, StoreError> {
        let post_id = self.open_post_id()?;
        let (author, content) = validate_comment(author, content)?;

        let comment = self.gateway.add_comment(post_id, author, content).await?;

        let appended = self.state.send_if_modified(|s| match &mut s.post {
            Some(post) if post.id() == post_id => {
                post.summary.comment_count += 1;
                s.comments.push(comment.clone());
                true
            }
            _ => false,
        });
        if !appended {
            debug!(post_id, "Comment saved for a post no longer on screen");
        }
        info!(id = comment.id, post_id, "Comment added");
        Ok(comment)
    }

    fn open_post_id(&self) -> Result<u64, StoreError> {
        self.state
            .borrow()
            .post
            .as_ref()
            .map(Post::id)
            .ok_or_else(|| CoreError::InvalidInput("no post is open".into()).into())
    }
}

/// Normalizes a comment before it is sent.
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` for blank content or an overlong
/// author name.
pub fn validate_comment<'a>(author: &'a str, content: &'a str) -> Result<(&'a str, &'a str), CoreError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(CoreError::InvalidInput("comment is empty".into()));
    }

    let author = match author.trim() {
        "" => ANONYMOUS,
        name if name.chars().count() > MAX_AUTHOR_LEN => {
            return Err(CoreError::InvalidInput(format!(
                "author name is longer than {MAX_AUTHOR_LEN} characters"
            )));
        }
        name => name,
    };
    Ok((author, content))
}

// ============================================================================
// Tests
// ============================================================================
