//! Integration tests for navigation, prefetch, and reactions through `App`.
//!
//! Page fetches go through a real `ArxivClient` against wiremock; the event
//! loop's role (spawn the fetch, hand the result back) is played inline.

use paperstream::app::App;
use paperstream::feed::{ArxivClient, FeedQuery, FetchOutcome, Page, Paper};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_body(start: usize, count: usize) -> String {
    let entries: String = (start..start + count)
        .map(|n| {
            format!(
                r#"<entry>
    <id>http://arxiv.org/abs/2403.{n:05}v1</id>
    <title>Paper {n}</title>
    <summary>Abstract {n}</summary>
    <published>2024-03-01T00:00:00Z</published>
  </entry>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>http://arxiv.org/api/test</id>
  <title>ArXiv Query</title>
  <updated>2024-03-01T00:00:00Z</updated>
  {}
</feed>"#,
        entries
    )
}

async fn mount_page(server: &MockServer, start: usize, count: usize, hits: u64) {
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("start", start.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_body(start, count)))
        .expect(hits)
        .mount(server)
        .await;
}

fn app_for(base_url: &str, page_size: usize) -> App {
    let query = FeedQuery {
        base_url: Url::parse(&format!("{}/api/query", base_url)).unwrap(),
        search_query: "cat:cs.AI".to_string(),
        page_size,
    };
    let client = ArxivClient::new(query, Duration::from_secs(5)).unwrap();
    App::new(client, Duration::from_millis(50))
}

/// Runs one prefetch cycle the way the event loop does. Returns false when
/// prefetch did not fire.
async fn pump(app: &mut App) -> bool {
    let Some(pending) = app.maybe_prefetch() else {
        return false;
    };
    let result = app.client.fetch_page(pending.page_index).await;
    app.apply_page(pending, result);
    true
}

#[tokio::test]
async fn test_scrolling_to_end_of_page_fetches_next() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 10, 1).await;
    mount_page(&server, 10, 10, 1).await;

    let mut app = app_for(&server.uri(), 10);
    assert!(pump(&mut app).await);
    assert_eq!(app.items().len(), 10);

    // Nothing to fetch until the last loaded paper is current
    for _ in 0..8 {
        app.next();
        assert!(!pump(&mut app).await);
    }
    app.next();
    assert_eq!(app.index(), 9);
    assert!(pump(&mut app).await);

    assert_eq!(app.items().len(), 20);
    assert_eq!(app.index(), 9);
    assert!(app.next());
}

#[tokio::test]
async fn test_short_feed_stops_at_last_paper() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 3, 1).await;

    let mut app = app_for(&server.uri(), 10);
    pump(&mut app).await;

    for _ in 0..10 {
        app.next();
        assert!(!pump(&mut app).await);
    }
    assert_eq!(app.index(), 2);
    assert!(app.loader.is_exhausted());
}

#[tokio::test]
async fn test_reload_after_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, 0, 5, 1).await;

    let mut app = app_for(&server.uri(), 5);
    pump(&mut app).await;
    assert!(app.items().is_empty());
    assert!(app.loader.last_error().is_some());
    assert!(!pump(&mut app).await);

    app.reload();
    assert!(pump(&mut app).await);
    assert_eq!(app.items().len(), 5);
    assert_eq!(app.index(), 0);
}

#[tokio::test]
async fn test_reactions_follow_paper_not_position() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 4, 1).await;

    let mut app = app_for(&server.uri(), 4);
    pump(&mut app).await;

    app.next();
    let liked_id = Arc::clone(&app.current().unwrap().id);
    assert_eq!(app.toggle_like(), Some(true));
    assert_eq!(app.toggle_bookmark(), Some(true));

    app.top();
    assert_eq!(app.index(), 0);
    assert!(!app.current_flags().liked);

    app.next();
    assert_eq!(app.current().unwrap().id, liked_id);
    let flags = app.current_flags();
    assert!(flags.liked && flags.bookmarked);

    app.reload();
    assert_eq!(app.reactions.liked_count(), 0);
}

// ============================================================================
// Property tests
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Next,
    Previous,
    Top,
    Deliver(usize),
    Reload,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Next),
        2 => Just(Op::Previous),
        1 => Just(Op::Top),
        2 => (0usize..=5).prop_map(Op::Deliver),
        1 => Just(Op::Reload),
    ]
}

fn synthetic_page(index: usize, count: usize) -> Page {
    let papers = (0..count)
        .map(|i| {
            Arc::new(Paper {
                id: Arc::from(format!("p{}-{}", index, i)),
                title: format!("Paper {}", i),
                summary: String::new(),
                authors: vec![],
                published: None,
                categories: vec![],
                link: String::new(),
            })
        })
        .collect();
    Page {
        index,
        papers,
        raw_len: count,
    }
}

proptest! {
    #[test]
    fn prop_index_always_valid(ops in prop::collection::vec(op(), 0..60)) {
        let mut app = app_for("http://127.0.0.1:9", 5);
        let mut pending = app.maybe_prefetch();

        for op in ops {
            match op {
                Op::Next => { app.next(); }
                Op::Previous => { app.previous(); }
                Op::Top => { app.top(); }
                Op::Deliver(count) => {
                    if let Some(p) = pending.take() {
                        let before = app.items().len();
                        let outcome = app.apply_page(p, Ok(synthetic_page(p.page_index, count)));
                        prop_assert_eq!(outcome, FetchOutcome::Appended { added: count });
                        prop_assert_eq!(app.items().len(), before + count);
                    }
                }
                Op::Reload => {
                    app.reload();
                    pending = None;
                    prop_assert_eq!(app.index(), 0);
                    prop_assert!(app.items().is_empty());
                }
            }

            if pending.is_none() {
                pending = app.maybe_prefetch();
            }

            let len = app.items().len();
            if len == 0 {
                prop_assert_eq!(app.index(), 0);
            } else {
                prop_assert!(app.index() < len);
            }
            // At most one fetch outstanding
            prop_assert!(pending.is_none() || app.maybe_prefetch().is_none());
        }
    }
}
