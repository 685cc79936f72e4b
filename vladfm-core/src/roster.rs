//! Author roster and route table.
//!
//! Regulars are a fixed set of distinguished authors with their own profile
//! route. Everyone else links to the generic user profile.

use std::fmt;

/// Names of the site regulars. Membership is exact and case-sensitive.
pub const REGULARS: &[&str] = &[
    "maroco",
    "The real CR7",
    "Kolodin",
    "kris",
    "leo",
    "sass the spurs fan",
    "viljandi tann",
    "talis chelsea fan",
    "shiki",
];

/// Returns true if `name` is one of the regulars.
pub fn is_regular(name: &str) -> bool {
    REGULARS.contains(&name)
}

/// Returns the profile path for an author.
///
/// Regulars resolve to `/regulars/<name>`, everyone else to
/// `/user/<name>`. The name is percent-encoded as one path segment.
pub fn author_link(name: &str) -> String {
    if is_regular(name) {
        Route::Regular(name.to_string()).path()
    } else {
        Route::User(name.to_string()).path()
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Client-side routes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/` - the feed.
    Home,
    /// `/post/:slug`
    Post(String),
    /// `/tag/:slug` - the feed filtered by tag.
    Tag(String),
    /// `/about`
    About,
    /// `/sponsor`
    Sponsor,
    /// `/user/:username`
    User(String),
    /// `/regulars`
    Regulars,
    /// `/regulars/:name`
    Regular(String),
    /// Anything else.
    NotFound(String),
}

impl Route {
    /// Resolves a path. Query strings and fragments are ignored; dynamic
    /// segments are percent-decoded.
    pub fn parse(path: &str) -> Self {
        let clean = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let segments: Vec<&str> = clean.split('/').filter(|s| !s.is_empty()).collect();

        let decoded = |raw: &str| -> Option<String> {
            urlencoding::decode(raw).ok().map(|s| s.into_owned())
        };

        let route = match segments.as_slice() {
            [] => Some(Self::Home),
            ["about"] => Some(Self::About),
            ["sponsor"] => Some(Self::Sponsor),
            ["regulars"] => Some(Self::Regulars),
            ["post", slug] => decoded(slug).map(Self::Post),
            ["tag", slug] => decoded(slug).map(Self::Tag),
            ["user", name] => decoded(name).map(Self::User),
            ["regulars", name] => decoded(name).map(Self::Regular),
            _ => None,
        };

        route.unwrap_or_else(|| Self::NotFound(path.to_string()))
    }

    /// Renders the route as a path with encoded segments.
    pub fn path(&self) -> String {
        let enc = |s: &str| urlencoding::encode(s).into_owned();
        match self {
            Self::Home => "/".to_string(),
            Self::Post(slug) => format!("/post/{}", enc(slug)),
            Self::Tag(slug) => format!("/tag/{}", enc(slug)),
            Self::About => "/about".to_string(),
            Self::Sponsor => "/sponsor".to_string(),
            Self::User(name) => format!("/user/{}", enc(name)),
            Self::Regulars => "/regulars".to_string(),
            Self::Regular(name) => format!("/regulars/{}", enc(name)),
            Self::NotFound(path) => path.clone(),
        }
    }

    /// Returns true for the catch-all route.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_regular() {
        assert!(is_regular("leo"));
        assert!(is_regular("The real CR7"));
        assert!(!is_regular("Leo"));
        assert!(!is_regular("unknown-user"));
    }

    #[test]
    fn test_regular_link() {
        assert_eq!(author_link("leo"), "/regulars/leo");
        assert_eq!(author_link("viljandi tann"), "/regulars/viljandi%20tann");
    }

    #[test]
    fn test_generic_user_link() {
        let link = author_link("unknown-user");
        assert_eq!(link, "/user/unknown-user");
        assert!(!link.starts_with("/regulars"));
    }

    #[test]
    fn test_author_link_round_trips_through_router() {
        assert_eq!(
            Route::parse(&author_link("The real CR7")),
            Route::Regular("The real CR7".to_string())
        );
        assert_eq!(
            Route::parse(&author_link("anon / guest")),
            Route::User("anon / guest".to_string())
        );
    }

    #[test]
    fn test_parse_static_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/about/"), Route::About);
        assert_eq!(Route::parse("/sponsor"), Route::Sponsor);
        assert_eq!(Route::parse("/regulars"), Route::Regulars);
    }

    #[test]
    fn test_parse_dynamic_routes() {
        assert_eq!(
            Route::parse("/post/derby-night?ref=home"),
            Route::Post("derby-night".to_string())
        );
        assert_eq!(Route::parse("/tag/la-liga"), Route::Tag("la-liga".to_string()));
    }

    #[test]
    fn test_parse_not_found() {
        assert!(Route::parse("/post").is_not_found());
        assert!(Route::parse("/admin/panel").is_not_found());
        assert!(Route::parse("/post/a/b").is_not_found());
    }
}
