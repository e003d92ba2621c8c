#[path = "common/mod.rs"]
mod common;

use common::*;
use serde_json::json;
use yak_archive::{
    merge_posts, mirror_feed, Endpoint, FetchError, FetchOptions, Fetcher, PageResult, ProgressScope, TransportError,
};

fn with_comment_count(mut v: serde_json::Value, n: u64) -> serde_json::Value {
    v["commentCount"] = json!(n);
    v
}

/// Demonstrates a full mirror run: feed posts merged, only threads whose comment count
/// changed are fetched, and a vanished post is counted rather than fatal.
#[test]
fn mirror_feed_fetches_stale_threads() {
    let dir = tempdir();
    let mut store = empty_store(dir.path());

    let feed = vec![
        with_comment_count(post_json("p1", Some("a"), "one", "2023-01-10T18:00:00Z"), 2),
        with_comment_count(post_json("p2", Some("b"), "two", "2023-01-10T17:00:00Z"), 0),
        with_comment_count(post_json("p3", Some("c"), "three", "2023-01-10T16:00:00Z"), 1),
    ];
    let mut t = ScriptedTransport::new(vec![
        Ok(PageResult::last(feed)),
        Ok(PageResult::last(vec![
            comment_json("c1", Some("b"), "hi", "2023-01-10T18:01:00Z"),
            comment_json("c2", Some("c"), "yo", "2023-01-10T18:02:00Z"),
        ])),
        Err(TransportError::NotFound { resource: "yak".into() }),
    ]);

    let report = mirror_feed(&mut store, &mut t, &FetchOptions::default(), false).unwrap();

    assert_eq!(report.posts.inserted, 3);
    assert_eq!(report.comments.inserted, 2);
    assert_eq!(report.threads_fetched, 1);
    assert_eq!(report.threads_missing, 1);
    assert_eq!(report.feed_cursor, None);
    assert_eq!(store.comments("p1").len(), 2);
    assert!(store.contains("p3"));

    let endpoints: Vec<Endpoint> = t.requests.iter().map(|r| r.endpoint.clone()).collect();
    assert_eq!(endpoints[1], Endpoint::Comments { post_id: "p1".into() });
    assert_eq!(endpoints[2], Endpoint::Comments { post_id: "p3".into() });
}

/// Demonstrates that items merged before a failure stay merged, and that resuming from
/// the error's cursor finishes the job without duplicates.
#[test]
fn partial_merge_survives_failure_and_resumes() {
    let dir = tempdir();
    let mut store = empty_store(dir.path());

    let mut t = ScriptedTransport::new(vec![
        Ok(PageResult::more(numbered_posts(0, 3), "c1")),
        Err(TransportError::Failed(anyhow::anyhow!("timeout"))),
    ]);
    let err = merge_posts(&mut store, Fetcher::new(&mut t).posts(), &ProgressScope::hidden()).unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }));
    assert_eq!(store.len(), 3);

    let resume = err.resume_cursor().map(str::to_string);
    let mut t = ScriptedTransport::pages(vec![PageResult::last(numbered_posts(2, 3))]);
    let stats =
        merge_posts(&mut store, Fetcher::new(&mut t).resume_from(resume.as_deref()).posts(), &ProgressScope::hidden())
            .unwrap();
    assert_eq!((stats.inserted, stats.updated), (2, 1));
    assert_eq!(store.len(), 5);
    assert_eq!(t.cursors(), vec![Some("c1".to_string())]);
}
