#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use yak_archive::{
    decode_comment, decode_post, ArchiveStore, Comment, PageRequest, PageResult, Post, StoreOptions, Transport,
    TransportError,
};

/// A raw post record as the feed returns it. `created_at` is RFC 3339.
pub fn post_json(id: &str, user: Option<&str>, text: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "userId": user,
        "text": text,
        "createdAt": created_at,
        "voteCount": 1,
        "commentCount": 0,
        "isIncognito": true,
        "userEmoji": "🐸",
        "userColor": "#00CBFE",
        "secondaryUserColor": "#0D13D5",
    })
}

/// A raw comment record as a thread page returns it.
pub fn comment_json(id: &str, user: Option<&str>, text: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "userId": user,
        "text": text,
        "createdAt": created_at,
        "voteCount": 0,
        "userEmoji": "🐸",
        "userColor": "#00CBFE",
        "secondaryUserColor": "#0D13D5",
    })
}

pub fn post(id: &str, user: Option<&str>, text: &str, created_at: &str) -> Post {
    decode_post(&post_json(id, user, text, created_at)).unwrap()
}

pub fn comment(post_id: &str, id: &str, user: Option<&str>, text: &str, created_at: &str) -> Comment {
    decode_comment(&comment_json(id, user, text, created_at), post_id).unwrap()
}

/// `n` numbered post records, ids `p{offset}`..`p{offset + n - 1}`.
pub fn numbered_posts(offset: usize, n: usize) -> Vec<Value> {
    (offset..offset + n)
        .map(|i| post_json(&format!("p{i}"), Some("u1"), "hello", "2023-01-10T18:00:00Z"))
        .collect()
}

pub fn ts(s: &str) -> OffsetDateTime {
    yak_archive::parse_timestamp(s).unwrap()
}

/// Transport that replays queued responses in order and records every request.
/// Running out of responses is a transport failure.
#[derive(Default)]
pub struct ScriptedTransport {
    pub responses: VecDeque<Result<PageResult, TransportError>>,
    pub requests: Vec<PageRequest>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<PageResult, TransportError>>) -> Self {
        Self { responses: responses.into(), requests: Vec::new() }
    }

    pub fn pages(pages: Vec<PageResult>) -> Self {
        Self::new(pages.into_iter().map(Ok).collect())
    }

    pub fn limits(&self) -> Vec<usize> {
        self.requests.iter().map(|r| r.limit).collect()
    }

    pub fn cursors(&self) -> Vec<Option<String>> {
        self.requests.iter().map(|r| r.cursor.clone()).collect()
    }
}

impl Transport for ScriptedTransport {
    fn fetch_page(&mut self, request: &PageRequest) -> Result<PageResult, TransportError> {
        self.requests.push(request.clone());
        self.responses
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Failed(anyhow::anyhow!("no scripted response left"))))
    }
}

/// Fresh temp directory; keep the handle alive for the duration of the test.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

pub fn archive_path(dir: &Path) -> PathBuf {
    dir.join("archive.json.zst")
}

/// Empty store backed by a file inside `dir`.
pub fn empty_store(dir: &Path) -> ArchiveStore {
    ArchiveStore::open(&StoreOptions::new(archive_path(dir))).unwrap()
}
