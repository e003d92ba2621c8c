#[path = "common/mod.rs"]
mod common;

use common::*;
use yak_archive::{FetchError, Fetcher, PageResult, Post, TransportError};

/// Demonstrates a capped fetch across three pages: 100 + 100 + 37 available, cap 250.
/// The third request asks for only the 50 still wanted, and exactly 237 items come out.
#[test]
fn capped_fetch_spans_pages_and_shrinks_last_limit() {
    let mut t = ScriptedTransport::pages(vec![
        PageResult::more(numbered_posts(0, 100), "c1"),
        PageResult::more(numbered_posts(100, 100), "c2"),
        PageResult::last(numbered_posts(200, 37)),
    ]);

    let posts: Vec<Post> = Fetcher::new(&mut t).max_items(250).posts().collect::<Result<_, _>>().unwrap();

    assert_eq!(posts.len(), 237);
    assert_eq!(posts[0].id, "p0");
    assert_eq!(posts[236].id, "p236");
    assert_eq!(t.limits(), vec![100, 100, 50]);
    assert_eq!(t.cursors(), vec![None, Some("c1".to_string()), Some("c2".to_string())]);
}

/// Demonstrates that a first page without `has_more` ends the fetch after one request.
#[test]
fn single_page_when_server_says_no_more() {
    let mut t = ScriptedTransport::pages(vec![PageResult::last(numbered_posts(0, 3))]);
    let mut it = Fetcher::new(&mut t).posts();
    assert_eq!(it.by_ref().filter(Result::is_ok).count(), 3);
    assert!(it.next().is_none());
    assert_eq!(it.requests_made(), 1);
    drop(it);
    assert_eq!(t.requests.len(), 1);
}

/// Demonstrates that a short page with `has_more` set is not treated as the end.
#[test]
fn short_page_with_more_keeps_going() {
    let mut t = ScriptedTransport::pages(vec![
        PageResult::more(numbered_posts(0, 10), "c1"),
        PageResult::last(numbered_posts(10, 5)),
    ]);
    let n = Fetcher::new(&mut t).posts().filter(Result::is_ok).count();
    assert_eq!(n, 15);
    assert_eq!(t.requests.len(), 2);
}

/// Demonstrates laziness: taking a few items from a 100-item page never asks for page two.
#[test]
fn dropping_early_issues_one_request() {
    let mut t = ScriptedTransport::pages(vec![
        PageResult::more(numbered_posts(0, 100), "c1"),
        PageResult::last(numbered_posts(100, 1)),
    ]);
    let first: Vec<_> = Fetcher::new(&mut t).posts().take(5).collect();
    assert_eq!(first.len(), 5);
    assert_eq!(t.requests.len(), 1);
}

/// Demonstrates that a cap of zero makes no request at all.
#[test]
fn zero_cap_makes_no_request() {
    let mut t = ScriptedTransport::default();
    assert!(Fetcher::new(&mut t).max_items(0).posts().next().is_none());
    assert!(t.requests.is_empty());
}

/// Demonstrates that the page size can never exceed the server maximum.
#[test]
fn page_size_is_clamped_to_server_max() {
    let mut t = ScriptedTransport::pages(vec![PageResult::last(vec![])]);
    let _ = Fetcher::new(&mut t).page_size(500).posts().count();
    assert_eq!(t.limits(), vec![100]);
}

/// Demonstrates that an absent thread is reported as NotFound before any item.
#[test]
fn missing_thread_is_not_found() {
    let mut t = ScriptedTransport::new(vec![Err(TransportError::NotFound { resource: "yak".into() })]);
    let mut it = Fetcher::new(&mut t).comments("gone");
    match it.next() {
        Some(Err(FetchError::NotFound { endpoint })) => assert!(endpoint.to_string().contains("gone")),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(it.next().is_none());
}

/// Demonstrates that `has_more` without a cursor is a protocol violation, not an empty end.
#[test]
fn has_more_without_cursor_is_protocol_violation() {
    let mut t = ScriptedTransport::pages(vec![PageResult {
        items: numbered_posts(0, 2),
        next_cursor: None,
        has_more: true,
    }]);
    let mut it = Fetcher::new(&mut t).posts();
    assert!(matches!(it.next(), Some(Err(FetchError::ProtocolViolation { .. }))));
    assert!(it.next().is_none());
}

/// Demonstrates that a cursor that does not move is rejected rather than looping forever.
#[test]
fn repeated_cursor_is_protocol_violation() {
    let mut t = ScriptedTransport::pages(vec![PageResult::more(numbered_posts(0, 2), "same")]);
    let mut it = Fetcher::new(&mut t).start_cursor("same").posts();
    match it.next() {
        Some(Err(e @ FetchError::ProtocolViolation { .. })) => assert_eq!(e.resume_cursor(), Some("same")),
        other => panic!("expected ProtocolViolation, got {other:?}"),
    }
}

/// Demonstrates that a transport failure on page two keeps page one's items and carries
/// the cursor needed to resume.
#[test]
fn transport_failure_carries_resume_cursor() {
    let mut t = ScriptedTransport::new(vec![
        Ok(PageResult::more(numbered_posts(0, 100), "c1")),
        Err(TransportError::Failed(anyhow::anyhow!("connection reset"))),
    ]);
    let mut ok = 0;
    let mut err = None;
    for item in Fetcher::new(&mut t).posts() {
        match item {
            Ok(_) => ok += 1,
            Err(e) => err = Some(e),
        }
    }
    assert_eq!(ok, 100);
    let err = err.expect("fetch should fail on page two");
    assert!(matches!(err, FetchError::Transport { .. }));
    assert_eq!(err.resume_cursor(), Some("c1"));
}

/// Demonstrates resuming from a cursor: the first request starts there.
#[test]
fn resume_from_cursor() {
    let mut t = ScriptedTransport::pages(vec![PageResult::last(numbered_posts(0, 1))]);
    let _ = Fetcher::new(&mut t).resume_from(Some("c7")).posts().count();
    assert_eq!(t.cursors(), vec![Some("c7".to_string())]);
}

/// Demonstrates that an undecodable item aborts the fetch with the item's index and
/// field, after yielding the items before it.
#[test]
fn decode_error_aborts_fetch() {
    let mut bad = post_json("p1", Some("u1"), "x", "2023-01-10T18:00:00Z");
    bad.as_object_mut().unwrap().remove("text");
    let items = vec![post_json("p0", Some("u1"), "x", "2023-01-10T18:00:00Z"), bad, post_json("p2", None, "x", "2023-01-10T18:00:00Z")];
    let mut t = ScriptedTransport::pages(vec![PageResult::more(items, "c1"), PageResult::last(numbered_posts(3, 1))]);

    let mut it = Fetcher::new(&mut t).posts();
    assert_eq!(it.next().unwrap().unwrap().id, "p0");
    match it.next() {
        Some(Err(FetchError::Decode { index, source, .. })) => {
            assert_eq!(index, 1);
            assert_eq!(source.field(), "text");
        }
        other => panic!("expected Decode, got {other:?}"),
    }
    assert!(it.next().is_none());
    assert_eq!(it.items_yielded(), 1);
    drop(it);
    assert_eq!(t.requests.len(), 1);
}

/// Demonstrates that after a decode abort the paginator resumes from the failing
/// page's own cursor, agreeing with the error, so nothing on that page is lost.
#[test]
fn decode_abort_resumes_at_failing_page() {
    let mut bad = post_json("p1", Some("u1"), "x", "2023-01-10T18:00:00Z");
    bad.as_object_mut().unwrap().remove("text");
    let items = vec![post_json("p0", Some("u1"), "x", "2023-01-10T18:00:00Z"), bad, post_json("p2", None, "x", "2023-01-10T18:00:00Z")];
    let mut t = ScriptedTransport::pages(vec![PageResult::more(items, "c1")]);

    let mut it = Fetcher::new(&mut t).start_cursor("c0").posts();
    assert!(it.next().unwrap().is_ok());
    let err = match it.next() {
        Some(Err(e @ FetchError::Decode { .. })) => e,
        other => panic!("expected Decode, got {other:?}"),
    };
    assert_eq!(err.resume_cursor(), Some("c0"));
    assert_eq!(it.resume_cursor(), err.resume_cursor());
    assert!(it.next().is_none());
    assert_eq!(it.resume_cursor(), Some("c0"));
}

/// Demonstrates that thread comments are stamped with the parent post id.
#[test]
fn comments_carry_parent_post_id() {
    let mut t = ScriptedTransport::pages(vec![PageResult::last(vec![
        comment_json("c1", Some("u2"), "hi", "2023-01-10T18:05:00Z"),
        comment_json("c2", None, "yo", "2023-01-10T18:06:00Z"),
    ])]);
    let comments: Vec<_> = Fetcher::new(&mut t).comments("p9").collect::<Result<_, _>>().unwrap();
    assert_eq!(comments.len(), 2);
    assert!(comments.iter().all(|c| c.post_id == "p9"));
    assert_eq!(comments[1].author_id, None);
}
