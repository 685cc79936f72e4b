//! Text output formatting with truth bars and colors.

use std::path::Path;

use chrono::{DateTime, Utc};
use vladfm_core::{
    AuthorSummary, Comment, Post, PostSummary, SiteStats, Tag, UserProfile, VoteState, VoteValue,
    author_link, is_regular, time_ago,
};
use vladfm_store::{EnvironmentSignals, FeedState, FeedStatus};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Truth bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
    now: DateTime<Utc>,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
            now: Utc::now(),
        }
    }

    /// Fixes the reference time for relative timestamps.
    #[allow(dead_code)]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    // ========================================================================
    // Feed
    // ========================================================================

    /// Formats a feed page.
    pub fn format_feed(&self, state: &FeedState) -> String {
        let mut lines = Vec::new();

        let mut header = format!("{} posts", self.bold(state.query.sort.as_str()));
        if let Some(tag) = &state.query.tag {
            header.push_str(&format!(" tagged {}", self.cyan(&format!("#{tag}"))));
        }
        lines.push(header);
        lines.push("─".repeat(50));

        if state.status == FeedStatus::Errored {
            let message = state.last_error.as_deref().unwrap_or("request failed");
            lines.push(self.red(&format!("Could not refresh: {message}")));
        }

        if state.posts.is_empty() {
            lines.push(self.dim("No posts yet."));
        }
        for post in &state.posts {
            lines.push(self.format_post_line(post));
        }

        lines.push(String::new());
        lines.push(self.format_pager(state));
        lines.join("\n")
    }

    /// Formats one feed entry on two lines.
    pub fn format_post_line(&self, post: &PostSummary) -> String {
        let tags: String = post
            .tags
            .iter()
            .map(|t| format!(" {}", self.dim(&format!("[{}]", t.name))))
            .collect();

        let comments = match post.comment_count {
            1 => "1 comment".to_string(),
            n => format!("{n} comments"),
        };

        format!(
            "{} {}{}\n      by {} · {} · {} · {}",
            self.format_score(post.score),
            self.bold(&post.title),
            tags,
            self.format_author(&post.author_name),
            time_ago(post.created_at, self.now),
            comments,
            self.dim(&post.slug)
        )
    }

    fn format_pager(&self, state: &FeedState) -> String {
        let mut pager = format!("Page {} of {}", state.page(), state.total_pages);
        if state.has_next() {
            pager.push_str(&self.dim(&format!("  (next: --page {})", state.page() + 1)));
        }
        pager
    }

    // ========================================================================
    // Post
    // ========================================================================

    /// Formats a full post with its comments.
    pub fn format_post(&self, post: &Post, comments: &[Comment], vote: Option<&VoteState>) -> String {
        let summary = &post.summary;
        let mut lines = Vec::new();

        lines.push(self.bold(&summary.title));
        lines.push(format!(
            "by {} · {} · id {}",
            self.format_author(&summary.author_name),
            time_ago(summary.created_at, self.now),
            summary.id
        ));
        if !summary.tags.is_empty() {
            let tags: Vec<String> = summary.tags.iter().map(|t| format!("#{}", t.slug)).collect();
            lines.push(self.cyan(&tags.join(" ")));
        }
        lines.push("─".repeat(50));
        lines.push(post.content.clone());
        lines.push("─".repeat(50));

        let your_vote = vote.map_or(VoteValue::None, |v| v.value);
        lines.push(format!(
            "Score: {}   Your vote: {}",
            self.format_score(summary.score).trim_start(),
            self.format_vote_value(your_vote)
        ));
        if summary.is_true_story {
            lines.push(format!("Truth:  {} {}%", self.truth_bar(summary.truth_score), summary.truth_score));
        }

        lines.push(String::new());
        lines.push(self.bold(&format!("Comments ({})", comments.len())));
        if comments.is_empty() {
            lines.push(self.dim("Be the first to comment."));
        }
        for comment in comments {
            lines.push(self.format_comment(comment));
        }

        lines.join("\n")
    }

    /// Formats a comment.
    pub fn format_comment(&self, comment: &Comment) -> String {
        format!(
            "  {} {}\n    {}",
            self.format_author(&comment.author_name),
            self.dim(&time_ago(comment.created_at, self.now)),
            comment.content.replace('\n', "\n    ")
        )
    }

    /// Formats a confirmed vote.
    pub fn format_vote(&self, vote: &VoteState) -> String {
        let mut line = format!(
            "Post {}: your vote {} · score {}",
            vote.post_id,
            self.format_vote_value(vote.value),
            vote.score
        );
        line.push_str(&format!(" · truth {}%", vote.truth_score));
        line
    }

    fn format_vote_value(&self, value: VoteValue) -> String {
        match value {
            VoteValue::Up => self.green("▲ up"),
            VoteValue::Down => self.red("▼ down"),
            VoteValue::None => self.dim("none"),
        }
    }

    // ========================================================================
    // Site
    // ========================================================================

    /// Formats the tag list.
    pub fn format_tags(&self, tags: &[Tag]) -> String {
        if tags.is_empty() {
            return self.dim("No tags.");
        }
        tags.iter()
            .map(|t| format!("{:<20} {}", t.name, self.dim(&format!("--tag {}", t.slug))))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats site statistics.
    pub fn format_stats(&self, stats: &SiteStats) -> String {
        let last_post = stats
            .last_post_at
            .map_or_else(|| "never".to_string(), |t| time_ago(t, self.now));

        [
            self.bold("vladFM"),
            "─".repeat(30),
            format!("Posts:     {}", stats.total_posts),
            format!("Comments:  {}", stats.total_comments),
            format!("Votes:     {}", stats.total_votes),
            format!("Tags:      {}", stats.total_tags),
            format!("Last post: {last_post}"),
        ]
        .join("\n")
    }

    /// Formats the regulars list.
    pub fn format_regulars(&self, regulars: &[AuthorSummary]) -> String {
        regulars
            .iter()
            .map(|r| {
                format!(
                    "{:<10} {:>4} comments  {}",
                    r.name,
                    r.comments,
                    self.dim(&author_link(&r.name))
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats a user profile.
    pub fn format_profile(&self, profile: &UserProfile) -> String {
        let mut lines = Vec::new();

        let mut header = self.bold(&profile.username);
        if profile.is_regular {
            header.push_str(&format!(" {}", self.yellow("★ regular")));
        }
        lines.push(header);
        if let Some(bio) = &profile.bio {
            lines.push(self.dim(bio));
        }
        lines.push(format!("{} posts · {} comments", profile.post_count, profile.comment_count));

        if !profile.posts.is_empty() {
            lines.push(String::new());
            lines.push(self.bold("Posts"));
            for post in &profile.posts {
                lines.push(self.format_post_line(post));
            }
        }

        if !profile.comments.is_empty() {
            lines.push(String::new());
            lines.push(self.bold("Comments"));
            for comment in &profile.comments {
                lines.push(format!(
                    "  on {} {}\n    {}",
                    comment.post_title,
                    self.dim(&time_ago(comment.created_at, self.now)),
                    comment.content
                ));
            }
        }

        if !profile.votes.is_empty() {
            lines.push(String::new());
            lines.push(self.bold("Votes"));
            for vote in &profile.votes {
                lines.push(format!("  {} {}", self.format_vote_value(vote.value), vote.post_title));
            }
        }

        lines.join("\n")
    }

    // ========================================================================
    // Identity & Links
    // ========================================================================

    /// Formats the local fingerprint.
    pub fn format_identity(&self, identity: &str, path: Option<&Path>, signals: &EnvironmentSignals) -> String {
        let stored = path.map_or_else(|| "memory only".to_string(), |p| p.display().to_string());
        [
            format!("Fingerprint: {}", self.cyan(identity)),
            format!("Stored in:   {stored}"),
            self.dim(&format!("Signals:     {}", signals.raw())),
        ]
        .join("\n")
    }

    /// Formats a resolved author link.
    pub fn format_link(&self, name: &str) -> String {
        let kind = if is_regular(name) { "regular" } else { "user" };
        format!("{} {} {}", self.bold(name), self.dim(&format!("({kind})")), author_link(name))
    }

    // ========================================================================
    // Bars & Scores
    // ========================================================================

    /// Formats a truth bar for a 0 to 100 score.
    pub fn truth_bar(&self, score: i32) -> String {
        let score = score.clamp(0, 100);
        let filled = (f64::from(score) / 100.0 * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_truth(score, &bar)
    }

    fn format_score(&self, score: i64) -> String {
        let text = format!("{score:>+4}");
        match score.signum() {
            1 => self.green(&text),
            -1 => self.red(&text),
            _ => self.dim(&format!("{score:>4}")),
        }
    }

    fn format_author(&self, name: &str) -> String {
        if is_regular(name) {
            format!("{} {}", name, self.yellow("★"))
        } else {
            name.to_string()
        }
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn color_for_truth(&self, score: i32, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if score < 20 {
            self.red(text)
        } else if score < 50 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truth_bar_full() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.truth_bar(100), "██████████");
    }

    #[test]
    fn test_truth_bar_empty() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.truth_bar(0), "░░░░░░░░░░");
    }

    #[test]
    fn test_truth_bar_clamps() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.truth_bar(140), "██████████");
        assert_eq!(formatter.truth_bar(-20), "░░░░░░░░░░");
    }

    #[test]
    fn test_color_for_truth() {
        let formatter = TextFormatter::new(true);
        assert!(formatter.color_for_truth(0, "x").contains(RED));
        assert!(formatter.color_for_truth(40, "x").contains(YELLOW));
        assert!(formatter.color_for_truth(80, "x").contains(GREEN));
    }

    #[test]
    fn test_format_score_signs() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.format_score(12), " +12");
        assert_eq!(formatter.format_score(-3), "  -3");
        assert_eq!(formatter.format_score(0), "   0");
    }

    #[test]
    fn test_regular_authors_are_starred() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.format_author("leo"), "leo ★");
        assert_eq!(formatter.format_author("stranger"), "stranger");
    }
}
