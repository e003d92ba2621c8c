use crate::transport::{FeedOrder, FeedType, MAX_PAGE_SIZE};
use std::path::{Path, PathBuf};

/// Pagination options with sensible defaults and builder chaining.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    pub page_size: usize,             // 1..=MAX_PAGE_SIZE
    pub max_items: Option<usize>,     // soft cap; None = until the server says stop
    pub start_cursor: Option<String>, // resume point from a previous run
    pub feed_type: FeedType,
    pub order: FeedOrder,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_items: None,
            start_cursor: None,
            feed_type: FeedType::Local,
            order: FeedOrder::New,
        }
    }
}

impl FetchOptions {
    /// Clamped to `1..=MAX_PAGE_SIZE`; the server limit cannot be raised.
    pub fn with_page_size(mut self, n: usize) -> Self {
        self.page_size = n.clamp(1, MAX_PAGE_SIZE);
        self
    }
    pub fn with_max_items(mut self, n: Option<usize>) -> Self {
        self.max_items = n;
        self
    }
    pub fn with_start_cursor(mut self, cursor: Option<String>) -> Self {
        self.start_cursor = cursor.filter(|c| !c.is_empty());
        self
    }
    pub fn with_feed_type(mut self, feed_type: FeedType) -> Self {
        self.feed_type = feed_type;
        self
    }
    pub fn with_order(mut self, order: FeedOrder) -> Self {
        self.order = order;
        self
    }
}

/// Where and how the archive blob is persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    pub path: PathBuf,
    pub zstd_level: i32,           // 1..=21
    pub write_buffer_bytes: usize, // BufWriter capacity for saves
    pub read_buffer_bytes: usize,  // BufReader capacity for loads
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from("yak_archive.json.zst"),
            zstd_level: 3,
            write_buffer_bytes: 256 * 1024,
            read_buffer_bytes: 256 * 1024,
        }
    }
}

impl StoreOptions {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::default().with_path(path)
    }

    /// Defaults overridden from the environment:
    /// - YAK_ARCHIVE_PATH: archive file location
    /// - YAK_ARCHIVE_ZSTD_LEVEL: compression level (ignored if unparsable)
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Ok(p) = std::env::var("YAK_ARCHIVE_PATH") {
            if !p.trim().is_empty() {
                opts = opts.with_path(p.trim());
            }
        }
        if let Ok(level) = std::env::var("YAK_ARCHIVE_ZSTD_LEVEL") {
            match level.trim().parse::<i32>() {
                Ok(n) => opts = opts.with_zstd_level(n),
                Err(_) => tracing::warn!("YAK_ARCHIVE_ZSTD_LEVEL is set but not an integer: {}", level),
            }
        }
        opts
    }

    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }
    pub fn with_zstd_level(mut self, level: i32) -> Self {
        self.zstd_level = level.clamp(1, 21);
        self
    }
    pub fn with_io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self {
        self.read_buffer_bytes = read_bytes.max(8 * 1024);
        self.write_buffer_bytes = write_bytes.max(8 * 1024);
        self
    }
}
