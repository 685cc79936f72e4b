//! Integration tests for author links and feed query rules.

use vladfm_core::{author_link, is_regular, FeedQuery, FeedSort, Route, REGULARS};

#[test]
fn test_every_regular_links_to_regular_profile() {
    for name in REGULARS {
        assert!(is_regular(name));
        match Route::parse(&author_link(name)) {
            Route::Regular(parsed) => assert_eq!(parsed, *name),
            other => panic!("{name} resolved to {other:?}"),
        }
    }
}

#[test]
fn test_unknown_author_links_to_user_profile() {
    assert_eq!(
        Route::parse(&author_link("unknown-user")),
        Route::User("unknown-user".to_string())
    );
}

#[test]
fn test_query_reset_rules() {
    let paged = FeedQuery::default().with_page(7).unwrap();
    assert_eq!(paged.clone().with_sort(FeedSort::Top).page, 1);
    assert_eq!(paged.with_tag(Some("x".to_string())).page, 1);
}
