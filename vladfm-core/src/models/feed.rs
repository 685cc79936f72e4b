//! Feed query and result types.
//!
//! [`FeedQuery`] carries the page-reset rule: changing the sort mode or the
//! tag filter always lands on page 1, while changing the page keeps sort and
//! tag as they are.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::post::PostSummary;
use crate::error::CoreError;

// ============================================================================
// Feed Sort
// ============================================================================

/// Sort modes accepted by `GET /posts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSort {
    /// Newest first.
    #[default]
    New,
    /// Highest score first.
    Top,
    /// Most comments first.
    Discussed,
}

impl FeedSort {
    /// Query-string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Top => "top",
            Self::Discussed => "discussed",
        }
    }

    /// Returns all sort modes in display order.
    pub fn all() -> &'static [FeedSort] {
        &[Self::New, Self::Top, Self::Discussed]
    }
}

impl fmt::Display for FeedSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "top" => Ok(Self::Top),
            "discussed" => Ok(Self::Discussed),
            other => Err(CoreError::InvalidSort(other.to_string())),
        }
    }
}

// ============================================================================
// Feed Query
// ============================================================================

/// Parameters of one feed request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedQuery {
    /// Sort mode.
    pub sort: FeedSort,
    /// Tag slug filter.
    pub tag: Option<String>,
    /// 1-based page number.
    pub page: u32,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            sort: FeedSort::New,
            tag: None,
            page: 1,
        }
    }
}

impl FeedQuery {
    /// Creates a query for page 1 of the given sort, without a tag filter.
    pub fn new(sort: FeedSort) -> Self {
        Self {
            sort,
            ..Self::default()
        }
    }

    /// Returns this query with a new sort mode, back on page 1.
    #[must_use]
    pub fn with_sort(self, sort: FeedSort) -> Self {
        Self {
            sort,
            page: 1,
            ..self
        }
    }

    /// Returns this query with a new tag filter, back on page 1.
    #[must_use]
    pub fn with_tag(self, tag: Option<String>) -> Self {
        Self {
            tag: tag.filter(|t| !t.is_empty()),
            page: 1,
            ..self
        }
    }

    /// Returns this query on another page, keeping sort and tag.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPage` for page 0.
    pub fn with_page(self, page: u32) -> Result<Self, CoreError> {
        if page == 0 {
            return Err(CoreError::InvalidPage(page));
        }
        Ok(Self { page, ..self })
    }

    /// Query-string pairs in the order the backend documents them.
    ///
    /// `tag` is only present when a filter is set.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("sort", self.sort.as_str().to_string()), ("page", self.page.to_string())];
        if let Some(tag) = &self.tag {
            params.push(("tag", tag.clone()));
        }
        params
    }
}

// ============================================================================
// Feed Result
// ============================================================================

/// One page of the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedResult {
    /// Posts on this page, in server order.
    pub items: Vec<PostSummary>,
    /// Number of pages for the current filter (at least 1).
    #[serde(rename = "pages")]
    pub total_pages: u32,
    /// Number of posts for the current filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Page echoed back by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl Default for FeedResult {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 1,
            total: None,
            page: None,
        }
    }
}

impl FeedResult {
    /// Creates a result from items and a page count.
    pub fn new(items: Vec<PostSummary>, total_pages: u32) -> Self {
        Self {
            items,
            total_pages,
            ..Self::default()
        }
        .normalized()
    }

    /// Clamps the page count to at least 1.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.total_pages = self.total_pages.max(1);
        self
    }

    /// Returns true if there is a page after `page`.
    pub fn has_next(&self, page: u32) -> bool {
        page < self.total_pages
    }

    /// Returns true if this page holds no posts.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_resets_page() {
        let query = FeedQuery::default().with_page(4).unwrap();
        let query = query.with_sort(FeedSort::Top);
        assert_eq!(query.page, 1);
        assert_eq!(query.sort, FeedSort::Top);
    }

    #[test]
    fn test_tag_resets_page() {
        let query = FeedQuery::new(FeedSort::Discussed).with_page(3).unwrap();
        let query = query.with_tag(Some("x".to_string()));
        assert_eq!(query.page, 1);
        assert_eq!(query.tag.as_deref(), Some("x"));
        assert_eq!(query.sort, FeedSort::Discussed);
    }

    #[test]
    fn test_empty_tag_clears_filter() {
        let query = FeedQuery::default().with_tag(Some(String::new()));
        assert!(query.tag.is_none());
    }

    #[test]
    fn test_page_keeps_sort_and_tag() {
        let query = FeedQuery::new(FeedSort::Top)
            .with_tag(Some("derby".to_string()))
            .with_page(2)
            .unwrap();
        assert_eq!(query.sort, FeedSort::Top);
        assert_eq!(query.tag.as_deref(), Some("derby"));
        assert_eq!(query.page, 2);
    }

    #[test]
    fn test_page_zero_rejected() {
        assert!(matches!(
            FeedQuery::default().with_page(0),
            Err(CoreError::InvalidPage(0))
        ));
    }

    #[test]
    fn test_params_omit_missing_tag() {
        let params = FeedQuery::default().to_params();
        assert_eq!(
            params,
            vec![("sort", "new".to_string()), ("page", "1".to_string())]
        );

        let params = FeedQuery::default().with_tag(Some("cl".to_string())).to_params();
        assert_eq!(params.last(), Some(&("tag", "cl".to_string())));
    }

    #[test]
    fn test_sort_from_str() {
        assert_eq!("TOP".parse::<FeedSort>().unwrap(), FeedSort::Top);
        assert!("hot".parse::<FeedSort>().is_err());
    }

    #[test]
    fn test_result_page_count_clamped() {
        let result = FeedResult::new(Vec::new(), 0);
        assert_eq!(result.total_pages, 1);
        assert!(!result.has_next(1));
    }
}
