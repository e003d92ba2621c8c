//! Cursor pagination as a pull-based iterator.
//!
//! A `Paginator` holds at most one page of raw records. The next page is requested only
//! when the consumer asks for an item after the current page is drained, so dropping the
//! iterator early leaves later pages unrequested. Nothing is retried here.
//!
//! Decode failures abort the fetch: the failing item is reported as
//! `FetchError::Decode` and the iterator ends. Items are never skipped silently.

use crate::codec::Decode;
use crate::config::FetchOptions;
use crate::error::{FetchError, TransportError};
use crate::model::{Comment, Post};
use crate::transport::{Endpoint, PageRequest, Transport, MAX_PAGE_SIZE};
use serde_json::Value;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Builder over a transport. Consumes the transport; pass `&mut transport` to reuse it.
pub struct Fetcher<T> {
    transport: T,
    opts: FetchOptions,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, opts: FetchOptions::default() }
    }

    pub fn with_options(transport: T, opts: FetchOptions) -> Self {
        Self { transport, opts }
    }

    // -------- Builder methods --------
    pub fn page_size(mut self, n: usize) -> Self { self.opts = self.opts.with_page_size(n); self }
    pub fn max_items(mut self, n: usize) -> Self { self.opts = self.opts.with_max_items(Some(n)); self }
    pub fn unbounded(mut self) -> Self { self.opts = self.opts.with_max_items(None); self }
    pub fn start_cursor(mut self, cursor: impl Into<String>) -> Self { self.opts = self.opts.with_start_cursor(Some(cursor.into())); self }
    pub fn resume_from(mut self, cursor: Option<&str>) -> Self { self.opts = self.opts.with_start_cursor(cursor.map(str::to_string)); self }
    pub fn feed_type(mut self, t: crate::transport::FeedType) -> Self { self.opts = self.opts.with_feed_type(t); self }
    pub fn order(mut self, o: crate::transport::FeedOrder) -> Self { self.opts = self.opts.with_order(o); self }

    /// Page through the configured feed.
    pub fn posts(self) -> Paginator<T, Post> {
        let endpoint = Endpoint::Feed { feed_type: self.opts.feed_type, order: self.opts.order };
        self.paginate(endpoint)
    }

    /// Page through the comment thread of one post.
    pub fn comments(self, post_id: impl Into<String>) -> Paginator<T, Comment> {
        self.paginate(Endpoint::Comments { post_id: post_id.into() })
    }

    pub fn paginate<I: Decode>(self, endpoint: Endpoint) -> Paginator<T, I> {
        Paginator::new(self.transport, endpoint, &self.opts)
    }
}

struct Page {
    request: PageRequest,
    items: std::vec::IntoIter<Value>,
    next_index: usize,
}

/// Lazy, finite, resumable sequence of decoded items from one endpoint.
pub struct Paginator<T, I> {
    transport: T,
    endpoint: Endpoint,
    page_size: usize,
    remaining: Option<usize>,
    cursor: Option<String>,
    page: Option<Page>,
    done: bool,
    requests: usize,
    yielded: usize,
    _item: PhantomData<fn() -> I>,
}

impl<T: Transport, I: Decode> Paginator<T, I> {
    pub fn new(transport: T, endpoint: Endpoint, opts: &FetchOptions) -> Self {
        Self {
            transport,
            endpoint,
            page_size: opts.page_size.clamp(1, MAX_PAGE_SIZE),
            remaining: opts.max_items,
            cursor: opts.start_cursor.clone(),
            page: None,
            done: opts.max_items == Some(0),
            requests: 0,
            yielded: 0,
            _item: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Number of page requests issued so far.
    pub fn requests_made(&self) -> usize {
        self.requests
    }

    pub fn items_yielded(&self) -> usize {
        self.yielded
    }

    /// Cursor that re-fetches the first page not yet fully yielded. While a page is
    /// partially consumed this is that page's own cursor; re-merging its items is harmless.
    pub fn resume_cursor(&self) -> Option<&str> {
        match &self.page {
            Some(p) if p.items.len() > 0 => p.request.cursor.as_deref(),
            _ => self.cursor.as_deref(),
        }
    }

    fn fetch_next_page(&mut self) -> Result<(), FetchError> {
        let limit = match self.remaining {
            Some(r) => r.min(self.page_size),
            None => self.page_size,
        };
        let request = PageRequest { endpoint: self.endpoint.clone(), cursor: self.cursor.clone(), limit };

        debug!(endpoint = %request.endpoint, cursor = ?request.cursor, limit, "requesting page");
        self.requests += 1;
        let page = match self.transport.fetch_page(&request) {
            Ok(p) => p,
            Err(TransportError::NotFound { resource }) => {
                debug!(%resource, "target does not exist upstream");
                return Err(FetchError::NotFound { endpoint: self.endpoint.clone() });
            }
            Err(TransportError::Failed(source)) => {
                return Err(FetchError::Transport { request, source });
            }
        };
        debug!(items = page.items.len(), has_more = page.has_more, "page received");

        let next_cursor = page.next_cursor.filter(|c| !c.is_empty());
        if page.has_more {
            let reason = match next_cursor.as_deref() {
                None => Some("has_more is set but the page carries no next cursor"),
                Some(c) if Some(c) == request.cursor.as_deref() => Some("next cursor did not advance"),
                Some(_) => None,
            };
            if let Some(reason) = reason {
                warn!(%request, reason, "protocol violation");
                return Err(FetchError::ProtocolViolation { request, reason: reason.to_string() });
            }
        }

        // A short page with has_more still set is not the end of the stream.
        if let Some(r) = self.remaining.as_mut() {
            *r = r.saturating_sub(page.items.len());
        }
        self.done = !page.has_more || self.remaining == Some(0);
        self.cursor = next_cursor;
        self.page = Some(Page { request, items: page.items.into_iter(), next_index: 0 });
        Ok(())
    }
}

impl<T: Transport, I: Decode> Iterator for Paginator<T, I> {
    type Item = Result<I, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(page) = self.page.as_mut() {
                if let Some(raw) = page.items.next() {
                    let index = page.next_index;
                    page.next_index += 1;
                    return match I::decode(&raw, &self.endpoint) {
                        Ok(item) => {
                            self.yielded += 1;
                            Some(Ok(item))
                        }
                        Err(source) => {
                            let request = page.request.clone();
                            warn!(%request, index, error = %source, "aborting fetch on undecodable item");
                            // resume must re-fetch the failing page, not skip past it
                            self.cursor = request.cursor.clone();
                            self.page = None;
                            self.done = true;
                            Some(Err(FetchError::Decode { request, index, source }))
                        }
                    };
                }
                self.page = None;
            }

            if self.done {
                return None;
            }
            if let Err(e) = self.fetch_next_page() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

impl<T: Transport, I: Decode> FusedIterator for Paginator<T, I> {}
