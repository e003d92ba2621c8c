//! Read-only windowed queries over an archive.
//!
//! Every function here is total over an empty archive and decides window membership
//! with `Window::contains`. Only threads attached to an archived post are visited
//! (orphaned threads have no post to window or attribute them to).

use crate::archive::ArchiveStore;
use crate::date::Window;
use crate::model::{Comment, Post};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use std::collections::BTreeMap;

#[inline]
fn by_author(author: Option<&str>, candidate: &Option<String>) -> bool {
    match author {
        None => true,
        Some(a) => candidate.as_deref() == Some(a),
    }
}

/// Average items per occurrence of an hour of day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct HourlyRate {
    pub posts: f64,
    pub comments: f64,
    pub total: f64,
}

/// Posts and comments per local hour-of-day, averaged over how often that hour occurs in
/// the window. All 24 hours are present; idle hours are 0.0.
pub fn hourly_activity(store: &ArchiveStore, author: Option<&str>, window: &Window) -> BTreeMap<u8, HourlyRate> {
    let mut posts = [0u64; 24];
    let mut comments = [0u64; 24];

    for (post, thread) in store.all() {
        if by_author(author, &post.author_id) && window.contains(post.created_at) {
            posts[window.local_hour(post.created_at) as usize] += 1;
        }
        for c in thread {
            if by_author(author, &c.author_id) && window.contains(c.created_at) {
                comments[window.local_hour(c.created_at) as usize] += 1;
            }
        }
    }

    let occurrences = window.hour_occurrences();
    (0..24u8)
        .map(|h| {
            let i = h as usize;
            let d = f64::from(occurrences[i].max(1));
            let rate = HourlyRate {
                posts: posts[i] as f64 / d,
                comments: comments[i] as f64 / d,
                total: (posts[i] + comments[i]) as f64 / d,
            };
            (h, rate)
        })
        .collect()
}

/// Per-author activity tallies. Vote sums are signed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserActivity {
    pub posts: u64,
    pub comments: u64,
    pub total: u64,
    pub post_votes: i64,
    pub comment_votes: i64,
    pub total_votes: i64,
}

/// Authors ranked by total activity, most active first.
pub fn most_active_users(store: &ArchiveStore, window: &Window) -> Vec<(String, UserActivity)> {
    most_active_users_by(store, window, |a| a.total)
}

/// Authors ranked by `key`, descending; ties broken by author id ascending.
/// Items with no author are not attributed to anyone.
pub fn most_active_users_by<K, F>(store: &ArchiveStore, window: &Window, key: F) -> Vec<(String, UserActivity)>
where
    K: Ord,
    F: Fn(&UserActivity) -> K,
{
    let mut tally: AHashMap<&str, UserActivity> = AHashMap::new();

    for (post, thread) in store.all() {
        if window.contains(post.created_at) {
            if let Some(author) = post.author_id.as_deref() {
                let a = tally.entry(author).or_default();
                a.posts += 1;
                a.total += 1;
                a.post_votes += post.vote_count;
                a.total_votes += post.vote_count;
            }
        }
        for c in thread {
            if !window.contains(c.created_at) { continue; }
            if let Some(author) = c.author_id.as_deref() {
                let a = tally.entry(author).or_default();
                a.comments += 1;
                a.total += 1;
                a.comment_votes += c.vote_count;
                a.total_votes += c.vote_count;
            }
        }
    }

    let mut ranked: Vec<(String, UserActivity)> = tally.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    ranked.sort_by(|a, b| key(&b.1).cmp(&key(&a.1)).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Switches for `co_occurrence`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoOccurrence {
    /// Count an author replying under their own post.
    pub include_self: bool,
    /// Count every comment, not just the first per commenter per thread.
    pub repeat_per_thread: bool,
    /// Only look at incognito posts.
    pub only_incognito: bool,
}

impl Default for CoOccurrence {
    fn default() -> Self {
        Self { include_self: false, repeat_per_thread: true, only_incognito: true }
    }
}

/// How often each commenter shows up under each author's posts, most frequent pair
/// first (ties by pair ascending). The window applies to the post's timestamp.
pub fn co_occurrence(store: &ArchiveStore, window: &Window, opts: CoOccurrence) -> Vec<((String, String), u64)> {
    let mut pairs: AHashMap<(&str, &str), u64> = AHashMap::new();

    for (post, thread) in store.all() {
        if !window.contains(post.created_at) { continue; }
        let Some(author) = post.author_id.as_deref() else { continue };
        if opts.only_incognito && !post.is_incognito { continue; }

        let mut seen: AHashSet<&str> = AHashSet::new();
        for c in thread {
            let Some(commenter) = c.author_id.as_deref() else { continue };
            if !opts.include_self && commenter == author { continue; }
            if !opts.repeat_per_thread && !seen.insert(commenter) { continue; }
            *pairs.entry((author, commenter)).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<((String, String), u64)> =
        pairs.into_iter().map(|((a, c), n)| ((a.to_string(), c.to_string()), n)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Posts in the window grouped by author, in archive order.
pub fn posts_by_user<'a>(store: &'a ArchiveStore, window: &Window) -> BTreeMap<String, Vec<&'a Post>> {
    let mut out: BTreeMap<String, Vec<&Post>> = BTreeMap::new();
    for (post, _) in store.all() {
        if !window.contains(post.created_at) { continue; }
        if let Some(author) = post.author_id.as_deref() {
            out.entry(author.to_string()).or_default().push(post);
        }
    }
    out
}

/// Comments in the window grouped by author, in archive then thread order.
pub fn comments_by_user<'a>(store: &'a ArchiveStore, window: &Window) -> BTreeMap<String, Vec<&'a Comment>> {
    let mut out: BTreeMap<String, Vec<&Comment>> = BTreeMap::new();
    for (_, thread) in store.all() {
        for c in thread {
            if !window.contains(c.created_at) { continue; }
            if let Some(author) = c.author_id.as_deref() {
                out.entry(author.to_string()).or_default().push(c);
            }
        }
    }
    out
}
