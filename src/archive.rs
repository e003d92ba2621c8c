//! Identity-keyed archive of posts and their comment threads.
//!
//! Posts live in a `Vec` with an id -> position index; each post's comments live in a
//! `Vec` with a per-post id -> position index. Merges replace in place through the index,
//! never by scanning. Ordering is normalized only on save (newest post first).

use crate::config::StoreOptions;
use crate::error::ArchiveError;
use crate::model::{Comment, Post};
use crate::storage::{ArchiveStorage, ZstdJsonStorage};
use ahash::AHashMap;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

pub const ARCHIVE_FORMAT_VERSION: u32 = 1;

/// The persisted aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    pub version: u32,
    pub posts: Vec<Post>,
    /// Keyed by post id. May hold threads whose post is not (or no longer) in `posts`.
    pub comments: BTreeMap<String, Vec<Comment>>,
}

impl Default for Archive {
    fn default() -> Self {
        Self { version: ARCHIVE_FORMAT_VERSION, posts: Vec::new(), comments: BTreeMap::new() }
    }
}

/// Outcome of merging one item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Merge {
    Inserted,
    Updated,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub inserted: usize,
    pub updated: usize,
}

impl MergeStats {
    pub fn record(&mut self, m: Merge) {
        match m {
            Merge::Inserted => self.inserted += 1,
            Merge::Updated => self.updated += 1,
        }
    }
    pub fn absorb(&mut self, other: MergeStats) {
        self.inserted += other.inserted;
        self.updated += other.updated;
    }
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Identifies one state of one open store. Changes on every mutation and every save
/// (saving reorders posts).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Snapshot {
    pub store_id: u64,
    pub revision: u64,
}

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Single-writer archive session state. All mutators take `&mut self`.
pub struct ArchiveStore {
    location: PathBuf,
    storage: Box<dyn ArchiveStorage>,
    archive: Archive,
    post_index: AHashMap<String, usize>,
    comment_index: AHashMap<String, AHashMap<String, usize>>,
    store_id: u64,
    revision: u64,
}

impl std::fmt::Debug for ArchiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveStore")
            .field("location", &self.location)
            .field("posts", &self.archive.posts.len())
            .field("threads", &self.archive.comments.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl ArchiveStore {
    /// Open the archive at `opts.path` with the default zstd/JSON storage.
    pub fn open(opts: &StoreOptions) -> Result<Self, ArchiveError> {
        Self::open_with(&opts.path, ZstdJsonStorage::new(opts))
    }

    /// Open `location` with default options. An absent file yields an empty archive.
    pub fn load(location: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        Self::open(&StoreOptions::new(location))
    }

    pub fn open_with(location: impl AsRef<Path>, storage: impl ArchiveStorage + 'static) -> Result<Self, ArchiveError> {
        let location = location.as_ref().to_path_buf();
        let archive = match storage.load(&location)? {
            Some(a) => a,
            None => {
                info!("no archive at {}, starting empty", location.display());
                Archive::default()
            }
        };
        let mut store = Self {
            location,
            storage: Box::new(storage),
            archive,
            post_index: AHashMap::new(),
            comment_index: AHashMap::new(),
            store_id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            revision: 0,
        };
        store.rebuild_indexes()?;
        info!("{} posts loaded from archive", store.archive.posts.len());
        Ok(store)
    }

    fn rebuild_indexes(&mut self) -> Result<(), ArchiveError> {
        let corrupt = |what: String| ArchiveError::Corrupt { path: self.location.clone(), source: anyhow!(what) };

        let mut post_index = AHashMap::with_capacity(self.archive.posts.len());
        for (i, p) in self.archive.posts.iter().enumerate() {
            if post_index.insert(p.key().to_string(), i).is_some() {
                return Err(corrupt(format!("duplicate post id {}", p.id)));
            }
        }

        let mut comment_index = AHashMap::with_capacity(self.archive.comments.len());
        for (post_id, comments) in &self.archive.comments {
            let mut idx = AHashMap::with_capacity(comments.len());
            for (i, c) in comments.iter().enumerate() {
                if idx.insert(c.key().to_string(), i).is_some() {
                    return Err(corrupt(format!("duplicate comment id {} under post {}", c.id, post_id)));
                }
            }
            comment_index.insert(post_id.clone(), idx);
        }

        self.post_index = post_index;
        self.comment_index = comment_index;
        Ok(())
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Insert a new post, or replace the stored one with the same id. Never touches
    /// the post's comments.
    pub fn add(&mut self, post: Post) -> Merge {
        self.revision += 1;
        match self.post_index.get(post.key()) {
            Some(&i) => {
                self.archive.posts[i] = post;
                Merge::Updated
            }
            None => {
                // appended out of order; save() restores newest-first
                self.post_index.insert(post.key().to_string(), self.archive.posts.len());
                self.archive.posts.push(post);
                Merge::Inserted
            }
        }
    }

    /// Insert-or-replace each comment by id within `post_id`'s thread. Comments are
    /// filed under `post_id` whatever their own `post_id` says.
    pub fn add_comments<I>(&mut self, post_id: &str, comments: I) -> MergeStats
    where
        I: IntoIterator<Item = Comment>,
    {
        let mut stats = MergeStats::default();
        let mut comments = comments.into_iter().peekable();
        if comments.peek().is_none() {
            return stats;
        }
        if !self.post_index.contains_key(post_id) {
            debug!(post_id, "merging comments for a post not in the archive");
        }
        let thread = self.archive.comments.entry(post_id.to_string()).or_default();
        let idx = self.comment_index.entry(post_id.to_string()).or_default();

        for mut c in comments {
            if c.post_id != post_id {
                c.post_id = post_id.to_string();
            }
            match idx.get(c.key()) {
                Some(&i) => {
                    thread[i] = c;
                    stats.record(Merge::Updated);
                }
                None => {
                    idx.insert(c.key().to_string(), thread.len());
                    thread.push(c);
                    stats.record(Merge::Inserted);
                }
            }
        }
        self.revision += 1;
        stats
    }

    /// Merge one comment into the thread named by its own `post_id`.
    pub fn add_comment(&mut self, comment: Comment) -> Merge {
        let post_id = comment.post_id.clone();
        let stats = self.add_comments(&post_id, std::iter::once(comment));
        if stats.inserted == 1 { Merge::Inserted } else { Merge::Updated }
    }

    /// The post and its current comments; `None` for an unknown id.
    pub fn get(&self, id: &str) -> Option<(&Post, &[Comment])> {
        let &i = self.post_index.get(id)?;
        let post = &self.archive.posts[i];
        Some((post, self.comments(id)))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.post_index.contains_key(id)
    }

    /// Comments stored under `post_id` (empty for unknown ids).
    pub fn comments(&self, post_id: &str) -> &[Comment] {
        self.archive.comments.get(post_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every post with its comments, in archive order. Use `.rev()` for oldest-first
    /// after a save.
    pub fn all(&self) -> impl DoubleEndedIterator<Item = (&Post, &[Comment])> + ExactSizeIterator + '_ {
        self.archive.posts.iter().map(move |p| (p, self.comments(p.key())))
    }

    /// Post ids that have comments but no post record.
    pub fn orphaned_threads(&self) -> impl Iterator<Item = &str> + '_ {
        self.archive
            .comments
            .iter()
            .filter(move |(id, thread)| !thread.is_empty() && !self.post_index.contains_key(id.as_str()))
            .map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.archive.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.posts.is_empty()
    }

    /// Total comments across all threads, orphans included.
    pub fn comment_count(&self) -> usize {
        self.archive.comments.values().map(Vec::len).sum()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot { store_id: self.store_id, revision: self.revision }
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Sort posts newest first and persist the whole archive. Bumps the revision.
    pub fn save(&mut self) -> Result<(), ArchiveError> {
        self.archive.posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        // order may have changed, which order-sensitive memoized results depend on
        self.revision += 1;
        for (i, p) in self.archive.posts.iter().enumerate() {
            if let Some(slot) = self.post_index.get_mut(p.key()) {
                *slot = i;
            }
        }
        self.storage.store(&self.location, &self.archive)?;
        info!("archive saved (length {})", self.archive.posts.len());
        Ok(())
    }

    /// Open `opts.path`, hand the store to `f`, then save whatever state `f` left behind,
    /// whether it succeeded or not. `f`'s error takes precedence over a save error.
    pub fn with_session<R, E, F>(opts: &StoreOptions, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut ArchiveStore) -> Result<R, E>,
        E: From<ArchiveError>,
    {
        let store = Self::open(opts)?;
        store.run_session(f)
    }

    /// Session over an already-open store; consumes it so nothing can touch it afterwards.
    pub fn run_session<R, E, F>(mut self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut ArchiveStore) -> Result<R, E>,
        E: From<ArchiveError>,
    {
        let outcome = f(&mut self);
        let saved = self.save();
        match (outcome, saved) {
            (Ok(v), Ok(())) => Ok(v),
            (Ok(_), Err(save_err)) => Err(save_err.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(save_err)) => {
                warn!(error = %save_err, "saving after a failed session also failed");
                Err(e)
            }
        }
    }
}
