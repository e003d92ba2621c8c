//! The network seam. This crate never builds URLs, headers or tokens: a `Transport`
//! turns one `PageRequest` into one page of raw records, or an error.

use crate::error::TransportError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Hard upper bound on items requested per page, whatever the caller asks for.
pub const MAX_PAGE_SIZE: usize = 100;

/// Server-side ordering of a feed. Items are yielded in this order, never re-sorted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FeedOrder {
    #[default]
    New,
    Hot,
    Top,
}

impl FeedOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedOrder::New => "NEW",
            FeedOrder::Hot => "HOT",
            FeedOrder::Top => "TOP",
        }
    }
}

impl FromStr for FeedOrder {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEW" => Ok(FeedOrder::New),
            "HOT" => Ok(FeedOrder::Hot),
            "TOP" => Ok(FeedOrder::Top),
            other => Err(format!("unknown feed order: {other}")),
        }
    }
}

/// Which feed scope to page through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FeedType {
    #[default]
    Local,
    Nationwide,
    /// Posts made by the requesting account.
    Mine,
}

impl FeedType {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedType::Local => "LOCAL",
            FeedType::Nationwide => "NATIONWIDE",
            FeedType::Mine => "SELF",
        }
    }
}

impl FromStr for FeedType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOCAL" => Ok(FeedType::Local),
            "NATIONWIDE" => Ok(FeedType::Nationwide),
            "SELF" | "MINE" => Ok(FeedType::Mine),
            other => Err(format!("unknown feed type: {other}")),
        }
    }
}

/// Identity of a paginated resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Feed { feed_type: FeedType, order: FeedOrder },
    Comments { post_id: String },
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Feed { feed_type, order } => {
                write!(f, "feed {}/{}", feed_type.as_str(), order.as_str())
            }
            Endpoint::Comments { post_id } => write!(f, "comment thread of post {post_id}"),
        }
    }
}

/// Parameters of a single page request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub endpoint: Endpoint,
    /// `None` requests the first page.
    pub cursor: Option<String>,
    /// Always within `1..=MAX_PAGE_SIZE`.
    pub limit: usize,
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} page (cursor={}, limit={})",
            self.endpoint,
            self.cursor.as_deref().unwrap_or("<start>"),
            self.limit
        )
    }
}

/// One page of raw records plus the page descriptor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageResult {
    pub items: Vec<Value>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl PageResult {
    /// A page with more to come after `cursor`.
    pub fn more(items: Vec<Value>, cursor: impl Into<String>) -> Self {
        Self { items, next_cursor: Some(cursor.into()), has_more: true }
    }

    /// The final page.
    pub fn last(items: Vec<Value>) -> Self {
        Self { items, next_cursor: None, has_more: false }
    }
}

/// Blocking page fetcher. Implementations own auth, HTTP, timeouts and any retry policy.
pub trait Transport {
    fn fetch_page(&mut self, request: &PageRequest) -> Result<PageResult, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn fetch_page(&mut self, request: &PageRequest) -> Result<PageResult, TransportError> {
        (**self).fetch_page(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn fetch_page(&mut self, request: &PageRequest) -> Result<PageResult, TransportError> {
        (**self).fetch_page(request)
    }
}

/// Closure adapter returned by [`from_fn`].
pub struct FnTransport<F>(F);

impl<F> Transport for FnTransport<F>
where
    F: FnMut(&PageRequest) -> Result<PageResult, TransportError>,
{
    fn fetch_page(&mut self, request: &PageRequest) -> Result<PageResult, TransportError> {
        (self.0)(request)
    }
}

/// Use a closure as a `Transport`.
pub fn from_fn<F>(f: F) -> FnTransport<F>
where
    F: FnMut(&PageRequest) -> Result<PageResult, TransportError>,
{
    FnTransport(f)
}
