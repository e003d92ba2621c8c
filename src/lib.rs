mod config;
mod date;
mod model;
mod error;

mod transport;
mod wire;
mod codec;
mod fetch;

mod util;
mod storage;
mod archive;
mod progress;
mod sync;

mod aggregate;
mod words;
mod emoji;
mod memo;

pub use crate::config::{FetchOptions, StoreOptions};
pub use crate::date::{parse_timestamp, Window, ARCHIVE_EPOCH, DEFAULT_OFFSET};
pub use crate::model::{Comment, ItemKind, Post, Video, VideoState, Vote};
pub use crate::error::{ArchiveError, DecodeError, FetchError, TransportError};

// Network seam: implement `Transport` (or wrap a closure with `from_fn`) to feed a `Fetcher`.
pub use crate::transport::{from_fn, Endpoint, FeedOrder, FeedType, FnTransport, PageRequest, PageResult, Transport, MAX_PAGE_SIZE};
pub use crate::wire::{connection_page, connection_path, variables};
pub use crate::codec::{decode_comment, decode_post, Decode};
pub use crate::fetch::{Fetcher, Paginator};

// Archive persistence and session handling.
pub use crate::storage::{ArchiveStorage, ZstdJsonStorage};
pub use crate::archive::{Archive, ArchiveStore, Merge, MergeStats, Snapshot, ARCHIVE_FORMAT_VERSION};
pub use crate::sync::{merge_posts, merge_thread, mirror_feed, MirrorReport};
pub use crate::progress::ProgressScope;

//export robust file ops and tracing setup so host binaries can import from crate root.
pub use crate::util::{init_tracing_once, open_with_backoff, create_with_backoff, remove_with_backoff, replace_file_atomic_backoff};

// Aggregates
pub use crate::aggregate::{
    co_occurrence, comments_by_user, hourly_activity, most_active_users, most_active_users_by, posts_by_user,
    CoOccurrence, HourlyRate, UserActivity,
};
pub use crate::words::{is_stop_word, normalize_text, tokenize, top_words, word_frequency, STOP_WORDS};
pub use crate::emoji::{color_code, emoji_usage, UNKNOWN_COLOR_CODE};
pub use crate::memo::Memo;
