//! In-memory gateway.
//!
//! Mirrors the backend's behaviour closely enough to drive the stores in
//! tests and in the CLI's offline mode: sorting, paging, per-fingerprint
//! vote upserts with truth-score adjustment, comment validation and 404s.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use vladfm_core::{
    is_regular, AuthorSummary, Comment, FeedResult, FeedSort, Post, PostSummary, SiteStats, Tag,
    UserComment, UserProfile, VoteState, VoteTally, VoteValue, REGULARS,
};

use crate::error::GatewayError;
use crate::gateway::ApiGateway;

/// Page size used by the backend.
pub const DEFAULT_PER_PAGE: usize = 5;

/// Truth score change per unit of vote delta.
const TRUTH_STEP: i32 = 20;

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Default)]
struct MemoryData {
    posts: Vec<Post>,
    comments: Vec<Comment>,
    votes: HashMap<(u64, String), VoteValue>,
    tags: Vec<Tag>,
    failure: Option<GatewayError>,
    next_post_id: u64,
    next_comment_id: u64,
}

impl MemoryData {
    fn score(&self, post_id: u64) -> i64 {
        self.votes
            .iter()
            .filter(|((id, _), _)| *id == post_id)
            .map(|(_, v)| v.as_i64())
            .sum()
    }

    fn comment_count(&self, post_id: u64) -> u64 {
        self.comments.iter().filter(|c| c.post_id == post_id).count() as u64
    }

    fn hydrate(&self, post: &Post) -> Post {
        let mut post = post.clone();
        post.summary.score = self.score(post.id());
        post.summary.comment_count = self.comment_count(post.id());
        post
    }

    fn post_by_id(&mut self, post_id: u64) -> Result<&mut Post, GatewayError> {
        self.posts
            .iter_mut()
            .find(|p| p.id() == post_id)
            .ok_or_else(|| GatewayError::not_found("post not found"))
    }

    fn tally(&self, post_id: u64, identity: &str, truth_score: i32) -> VoteTally {
        VoteTally {
            score: self.score(post_id),
            user_vote: self
                .votes
                .get(&(post_id, identity.to_string()))
                .copied()
                .unwrap_or_default(),
            truth_score,
        }
    }
}

// ============================================================================
// Memory Gateway
// ============================================================================

/// In-memory [`ApiGateway`]. Cloning shares the same data.
#[derive(Debug, Clone)]
pub struct MemoryGateway {
    data: Arc<Mutex<MemoryData>>,
    per_page: usize,
    requests: Arc<AtomicU64>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(MemoryData {
                next_post_id: 1,
                next_comment_id: 1,
                ..Default::default()
            })),
            per_page: DEFAULT_PER_PAGE,
            requests: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Creates a gateway seeded with a handful of posts, tags and comments.
    pub fn with_demo_data() -> Self {
        let gateway = Self::new();
        let now = Utc::now();

        let tags = [
            gateway.add_tag("La Liga", "#a50044"),
            gateway.add_tag("Premier League", "#3d195b"),
            gateway.add_tag("Transfers", "#0b7a75"),
        ];

        let clasico = gateway.add_post(
            "Clasico ratings are in",
            "maroco",
            "Midfield won it. Everything else is commentary.",
            &[tags[0].clone()],
            now - Duration::hours(3),
        );
        let spurs = gateway.add_post(
            "Spurs found a new way",
            "sass the spurs fan",
            "Two goals up at half time. You know the rest.",
            &[tags[1].clone()],
            now - Duration::days(1),
        );
        gateway.add_post(
            "Estonian roots, part 7",
            "viljandi tann",
            "Every third footballer. Look hard enough.",
            &[tags[1].clone(), tags[2].clone()],
            now - Duration::days(4),
        );

        gateway.add_seed_comment(clasico.id(), "kris", "Pedri is physics.", now - Duration::hours(2));
        gateway.add_seed_comment(clasico.id(), "leo", "Better script than most films.", now - Duration::hours(1));
        gateway.add_seed_comment(spurs.id(), "talis chelsea fan", "Structural integrity.", now - Duration::hours(20));

        gateway
    }

    fn lock(&self) -> MutexGuard<'_, MemoryData> {
        // A poisoned lock only means a test panicked mid-update.
        self.data.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn begin(&self) -> Result<MutexGuard<'_, MemoryData>, GatewayError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let data = self.lock();
        if let Some(err) = data.failure.clone() {
            return Err(err);
        }
        Ok(data)
    }

    // ========================================================================
    // Seeding
    // ========================================================================

    /// Adds a tag and returns it.
    pub fn add_tag(&self, name: &str, color: &str) -> Tag {
        let mut data = self.lock();
        let tag = Tag {
            id: data.tags.len() as u64 + 1,
            name: name.to_string(),
            slug: slugify(name),
            color: color.to_string(),
        };
        data.tags.push(tag.clone());
        tag
    }

    /// Adds a post and returns it. The slug is derived from the title.
    pub fn add_post(
        &self,
        title: &str,
        author: &str,
        content: &str,
        tags: &[Tag],
        created_at: DateTime<Utc>,
    ) -> Post {
        let mut data = self.lock();
        let id = data.next_post_id;
        data.next_post_id += 1;

        let post = Post {
            summary: PostSummary {
                id,
                title: title.to_string(),
                slug: slugify(title),
                author_name: author.to_string(),
                is_true_story: false,
                truth_score: 0,
                created_at,
                tags: tags.to_vec(),
                score: 0,
                comment_count: 0,
            },
            content: content.to_string(),
        };
        data.posts.push(post.clone());
        post
    }

    /// Adds a comment with a fixed timestamp.
    pub fn add_seed_comment(
        &self,
        post_id: u64,
        author: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Comment {
        let mut data = self.lock();
        let comment = Comment {
            id: data.next_comment_id,
            post_id,
            author_name: author.to_string(),
            content: content.to_string(),
            created_at,
        };
        data.next_comment_id += 1;
        data.comments.push(comment.clone());
        comment
    }

    // ========================================================================
    // Fault Injection & Inspection
    // ========================================================================

    /// Makes every subsequent call fail with `error`, or succeed again
    /// with `None`.
    pub fn set_failure(&self, error: Option<GatewayError>) {
        self.lock().failure = error;
    }

    /// Number of gateway calls made so far.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    /// Stored vote for a (post, fingerprint) pair.
    pub fn stored_vote(&self, post_id: u64, identity: &str) -> Option<VoteValue> {
        self.lock().votes.get(&(post_id, identity.to_string())).copied()
    }
}

#[async_trait]
impl ApiGateway for MemoryGateway {
    async fn list_posts(
        &self,
        sort: FeedSort,
        tag: Option<&str>,
        page: u32,
    ) -> Result<FeedResult, GatewayError> {
        let data = self.begin()?;
        if page == 0 {
            return Err(GatewayError::api(422, r#"{"detail":"page must be >= 1"}"#));
        }

        let mut posts: Vec<PostSummary> = data
            .posts
            .iter()
            .filter(|p| tag.is_none_or(|t| p.summary.has_tag(t)))
            .map(|p| data.hydrate(p).summary)
            .collect();

        match sort {
            FeedSort::New => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            FeedSort::Top => posts.sort_by(|a, b| b.score.cmp(&a.score)),
            FeedSort::Discussed => posts.sort_by(|a, b| b.comment_count.cmp(&a.comment_count)),
        }

        let total = posts.len();
        let pages = total.div_ceil(self.per_page).max(1);
        let start = (page as usize - 1) * self.per_page;
        let items: Vec<PostSummary> = posts.into_iter().skip(start).take(self.per_page).collect();

        Ok(FeedResult {
            items,
            total_pages: u32::try_from(pages).unwrap_or(u32::MAX),
            total: Some(total as u64),
            page: Some(page),
        })
    }

    async fn get_post(&self, slug: &str) -> Result<Post, GatewayError> {
        let data = self.begin()?;
        data.posts
            .iter()
            .find(|p| p.slug() == slug)
            .map(|p| data.hydrate(p))
            .ok_or_else(|| GatewayError::not_found("post not found"))
    }

    async fn list_comments(&self, post_id: u64) -> Result<Vec<Comment>, GatewayError> {
        let mut data = self.begin()?;
        data.post_by_id(post_id)?;
        let mut comments: Vec<Comment> = data
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn add_comment(
        &self,
        post_id: u64,
        author_name: &str,
        content: &str,
    ) -> Result<Comment, GatewayError> {
        let mut data = self.begin()?;
        data.post_by_id(post_id)?;
        if content.trim().is_empty() {
            return Err(GatewayError::api(422, r#"{"detail":"content must not be empty"}"#));
        }

        let comment = Comment {
            id: data.next_comment_id,
            post_id,
            author_name: author_name.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        data.next_comment_id += 1;
        data.comments.push(comment.clone());
        Ok(comment)
    }

    async fn cast_vote(
        &self,
        post_id: u64,
        identity: &str,
        value: VoteValue,
    ) -> Result<VoteState, GatewayError> {
        let mut data = self.begin()?;
        data.post_by_id(post_id)?;

        let key = (post_id, identity.to_string());
        let old = data.votes.get(&key).copied().unwrap_or_default();
        if value.is_cast() {
            data.votes.insert(key, value);
        } else {
            data.votes.remove(&key);
        }

        let delta = i32::try_from(value.as_i64() - old.as_i64()).unwrap_or(0);
        let post = data.post_by_id(post_id)?;
        if delta != 0 {
            post.summary.truth_score = (post.summary.truth_score + delta * TRUTH_STEP).clamp(0, 100);
        }
        let truth_score = post.summary.truth_score;

        let tally = data.tally(post_id, identity, truth_score);
        Ok(VoteState::from_tally(post_id, identity, tally))
    }

    async fn get_vote(&self, post_id: u64, identity: &str) -> Result<Option<VoteState>, GatewayError> {
        let mut data = self.begin()?;
        let truth_score = data.post_by_id(post_id)?.summary.truth_score;
        let tally = data.tally(post_id, identity, truth_score);
        Ok(Some(VoteState::from_tally(post_id, identity, tally)))
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, GatewayError> {
        let data = self.begin()?;
        let mut tags = data.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn get_stats(&self) -> Result<SiteStats, GatewayError> {
        let data = self.begin()?;
        Ok(SiteStats {
            total_posts: data.posts.len() as u64,
            total_comments: data.comments.len() as u64,
            total_votes: data.votes.len() as u64,
            total_tags: data.tags.len() as u64,
            last_post_at: data.posts.iter().map(|p| p.summary.created_at).max(),
        })
    }

    async fn list_regulars(&self) -> Result<Vec<AuthorSummary>, GatewayError> {
        let data = self.begin()?;
        let mut regulars: Vec<AuthorSummary> = REGULARS
            .iter()
            .map(|name| AuthorSummary {
                name: (*name).to_string(),
                comments: data.comments.iter().filter(|c| c.author_name == *name).count() as u64,
            })
            .collect();
        regulars.sort_by(|a, b| b.comments.cmp(&a.comments));
        Ok(regulars)
    }

    async fn get_user_profile(&self, username: &str) -> Result<UserProfile, GatewayError> {
        let data = self.begin()?;

        let mut posts: Vec<PostSummary> = data
            .posts
            .iter()
            .filter(|p| p.summary.author_name == username)
            .map(|p| data.hydrate(p).summary)
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut comments: Vec<UserComment> = data
            .comments
            .iter()
            .filter(|c| c.author_name == username)
            .filter_map(|c| {
                let post = data.posts.iter().find(|p| p.id() == c.post_id)?;
                Some(UserComment {
                    id: c.id,
                    post_id: c.post_id,
                    author_name: c.author_name.clone(),
                    content: c.content.clone(),
                    created_at: c.created_at,
                    post_title: post.summary.title.clone(),
                    post_slug: post.summary.slug.clone(),
                })
            })
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if posts.is_empty() && comments.is_empty() {
            return Err(GatewayError::not_found("user not found"));
        }

        Ok(UserProfile {
            username: username.to_string(),
            is_regular: is_regular(username),
            bio: None,
            post_count: posts.len() as u64,
            comment_count: comments.len() as u64,
            posts,
            comments,
            votes: Vec::new(),
        })
    }
}

/// Lowercase, ASCII-alphanumeric words joined by `-`.
fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

// ============================================================================
// Tests
// ============================================================================
