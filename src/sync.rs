//! Drain paginators into an archive.
//!
//! Items are merged one at a time as they arrive, so everything yielded before a
//! failure is already in the store when the error comes back. Re-running from the
//! error's `resume_cursor()` is safe because merges are idempotent.

use crate::archive::{ArchiveStore, MergeStats};
use crate::config::FetchOptions;
use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::model::{Comment, Post};
use crate::progress::ProgressScope;
use crate::transport::Transport;
use tracing::{info, warn};

/// Merge every post from `items` into `store`.
pub fn merge_posts<I>(store: &mut ArchiveStore, items: I, progress: &ProgressScope) -> Result<MergeStats, FetchError>
where
    I: IntoIterator<Item = Result<Post, FetchError>>,
{
    let mut stats = MergeStats::default();
    for item in items {
        stats.record(store.add(item?));
        progress.inc_items(1);
    }
    Ok(stats)
}

/// Merge every comment from `items` into `post_id`'s thread.
pub fn merge_thread<I>(
    store: &mut ArchiveStore,
    post_id: &str,
    items: I,
    progress: &ProgressScope,
) -> Result<MergeStats, FetchError>
where
    I: IntoIterator<Item = Result<Comment, FetchError>>,
{
    let mut stats = MergeStats::default();
    for item in items {
        stats.absorb(store.add_comments(post_id, std::iter::once(item?)));
        progress.inc_items(1);
    }
    Ok(stats)
}

/// Result of a `mirror_feed` run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub posts: MergeStats,
    pub comments: MergeStats,
    pub threads_fetched: usize,
    /// Threads whose post disappeared upstream between the feed and thread fetch.
    pub threads_missing: usize,
    /// Cursor after the last feed page consumed; start the next run here to continue
    /// further back in the feed.
    pub feed_cursor: Option<String>,
}

/// Page through the feed described by `opts`, merge every post, then fetch the thread
/// of each post whose advertised comment count differs from what the archive holds.
/// One request is in flight at a time.
pub fn mirror_feed<T: Transport>(
    store: &mut ArchiveStore,
    transport: &mut T,
    opts: &FetchOptions,
    show_progress: bool,
) -> Result<MirrorReport, FetchError> {
    let progress = ProgressScope::new(show_progress, "Mirror: feed");
    let mut report = MirrorReport::default();

    let mut feed = Fetcher::with_options(&mut *transport, opts.clone()).posts();
    let mut stale = Vec::new();
    for item in feed.by_ref() {
        let post = item?;
        if post.comment_count as usize != store.comments(post.key()).len() {
            stale.push(post.id.clone());
        }
        report.posts.record(store.add(post));
        progress.inc_items(1);
    }
    report.feed_cursor = feed.resume_cursor().map(str::to_string);
    drop(feed);

    progress.set_label("Mirror: threads");
    for post_id in stale {
        let thread = Fetcher::new(&mut *transport).comments(post_id.as_str());
        match merge_thread(store, &post_id, thread, &progress) {
            Ok(stats) => {
                report.comments.absorb(stats);
                report.threads_fetched += 1;
            }
            Err(FetchError::NotFound { endpoint }) => {
                warn!(%endpoint, "post vanished upstream; keeping archived copy");
                report.threads_missing += 1;
            }
            Err(e) => return Err(e),
        }
    }

    progress.finish("Mirror: done");
    info!(
        posts_inserted = report.posts.inserted,
        posts_updated = report.posts.updated,
        comments_inserted = report.comments.inserted,
        comments_updated = report.comments.updated,
        threads_missing = report.threads_missing,
        "mirror run finished"
    );
    Ok(report)
}
