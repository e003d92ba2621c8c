//! Typed feed items. Identity is an explicit key (`Post::key`, `Comment::key`);
//! structural equality stays the derived one.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Which item shape a record decodes into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Post,
    Comment,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Post => f.write_str("post"),
            ItemKind::Comment => f.write_str("comment"),
        }
    }
}

/// The requesting account's vote on an item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vote {
    Up,
    Down,
    #[default]
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoState {
    #[default]
    None,
    Ready,
    Processing,
    Failed,
}

/// Video attachment; only present when the record carries a video id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub state: VideoState,
    pub dash_url: Option<String>,
    pub hls_url: Option<String>,
    pub mp4_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    /// `None` for anonymous/legacy posts. Never replaced by a placeholder.
    pub author_id: Option<String>,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub vote_count: i64,
    pub comment_count: u64,
    pub is_incognito: bool,

    // display attributes; may change between fetches of the same id
    pub emoji: Option<String>,
    pub color: Option<String>,
    pub secondary_color: Option<String>,

    #[serde(default)]
    pub is_mine: bool,
    #[serde(default)]
    pub is_reported: bool,
    #[serde(default)]
    pub my_vote: Vote,
    #[serde(default)]
    pub distance: Option<i64>,
    #[serde(default)]
    pub geohash: Option<String>,
    #[serde(default)]
    pub interest_areas: Vec<String>,
    #[serde(default)]
    pub video: Option<Video>,
}

impl Post {
    #[inline]
    pub fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique among the comments of `post_id` only.
    pub id: String,
    pub post_id: String,
    pub author_id: Option<String>,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub vote_count: i64,
    /// `None` when the thread showed the "OP" badge instead of an emoji.
    pub emoji: Option<String>,
    pub color: Option<String>,
    pub secondary_color: Option<String>,

    #[serde(default)]
    pub is_mine: bool,
    #[serde(default)]
    pub is_reported: bool,
    #[serde(default)]
    pub my_vote: Vote,
}

impl Comment {
    #[inline]
    pub fn key(&self) -> &str {
        &self.id
    }
}
