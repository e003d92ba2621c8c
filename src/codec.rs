//! Raw record -> typed item decoding.
//!
//! Every field is either required (absent or `null` is a `DecodeError::Missing`) or
//! optional (absent, `null` and `""` all decode to `None`/default). A value of the wrong
//! JSON type is always `DecodeError::Invalid`, naming the field.

use crate::date::parse_timestamp;
use crate::error::DecodeError;
use crate::model::{Comment, ItemKind, Post, Video, VideoState, Vote};
use crate::transport::Endpoint;
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Items a paginator can produce.
pub trait Decode: Sized {
    fn decode(raw: &Value, endpoint: &Endpoint) -> Result<Self, DecodeError>;
}

impl Decode for Post {
    fn decode(raw: &Value, _endpoint: &Endpoint) -> Result<Self, DecodeError> {
        decode_post(raw)
    }
}

impl Decode for Comment {
    /// The parent id comes from the thread endpoint; a `postId` field on the record is
    /// the fallback for records fetched some other way.
    fn decode(raw: &Value, endpoint: &Endpoint) -> Result<Self, DecodeError> {
        match endpoint {
            Endpoint::Comments { post_id } => decode_comment(raw, post_id),
            Endpoint::Feed { .. } => {
                let f = Fields::new(ItemKind::Comment, raw)?;
                let post_id = f.str_required("postId")?.to_string();
                decode_comment(raw, &post_id)
            }
        }
    }
}

pub fn decode_post(raw: &Value) -> Result<Post, DecodeError> {
    let f = Fields::new(ItemKind::Post, raw)?;
    let id = f.str_required("id")?.to_string();

    let video = match f.str_opt("videoId")? {
        Some(video_id) => Some(Video {
            id: video_id,
            state: f.video_state("videoState")?,
            dash_url: f.str_opt("videoPlaybackDashUrl")?,
            hls_url: f.str_opt("videoPlaybackHlsUrl")?,
            mp4_url: f.str_opt("videoDownloadMp4Url")?,
            thumbnail_url: f.str_opt("videoThumbnailUrl")?,
        }),
        None => None,
    };

    Ok(Post {
        id,
        author_id: f.str_opt("userId")?,
        text: f.str_required("text")?.to_string(),
        created_at: f.timestamp("createdAt")?,
        vote_count: f.i64_required("voteCount")?,
        comment_count: f.u64_or_zero("commentCount")?,
        is_incognito: f.bool_or_false("isIncognito")?,
        emoji: f.str_opt("userEmoji")?,
        color: f.str_opt("userColor")?,
        secondary_color: f.str_opt("secondaryUserColor")?,
        is_mine: f.bool_or_false("isMine")?,
        is_reported: f.bool_or_false("isReported")?,
        my_vote: f.vote("myVote")?,
        distance: f.i64_opt("distance")?,
        geohash: f.str_opt("geohash")?,
        interest_areas: f.str_list("interestAreas")?,
        video,
    })
}

pub fn decode_comment(raw: &Value, post_id: &str) -> Result<Comment, DecodeError> {
    let f = Fields::new(ItemKind::Comment, raw)?;
    Ok(Comment {
        id: f.str_required("id")?.to_string(),
        post_id: post_id.to_string(),
        author_id: f.str_opt("userId")?,
        text: f.str_required("text")?.to_string(),
        created_at: f.timestamp("createdAt")?,
        vote_count: f.i64_required("voteCount")?,
        emoji: f.str_opt("userEmoji")?,
        color: f.str_opt("userColor")?,
        secondary_color: f.str_opt("secondaryUserColor")?,
        is_mine: f.bool_or_false("isMine")?,
        is_reported: f.bool_or_false("isReported")?,
        my_vote: f.vote("myVote")?,
    })
}

/// Typed accessors over one record object.
struct Fields<'a> {
    kind: ItemKind,
    obj: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn new(kind: ItemKind, raw: &'a Value) -> Result<Self, DecodeError> {
        match raw.as_object() {
            Some(obj) => Ok(Self { kind, obj }),
            None => Err(DecodeError::Invalid {
                kind,
                field: "<record>",
                reason: format!("expected a JSON object, got {}", type_name(raw)),
            }),
        }
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.obj.get(field).filter(|v| !v.is_null())
    }

    fn missing(&self, field: &'static str) -> DecodeError {
        DecodeError::Missing { kind: self.kind, field }
    }

    fn invalid(&self, field: &'static str, reason: impl Into<String>) -> DecodeError {
        DecodeError::Invalid { kind: self.kind, field, reason: reason.into() }
    }

    fn wrong_type(&self, field: &'static str, expected: &str, got: &Value) -> DecodeError {
        self.invalid(field, format!("expected {expected}, got {}", type_name(got)))
    }

    fn str_required(&self, field: &'static str) -> Result<&'a str, DecodeError> {
        match self.get(field) {
            None => Err(self.missing(field)),
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(self.wrong_type(field, "a string", other)),
        }
    }

    fn str_opt(&self, field: &'static str) -> Result<Option<String>, DecodeError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.wrong_type(field, "a string", other)),
        }
    }

    fn i64_opt(&self, field: &'static str) -> Result<Option<i64>, DecodeError> {
        match self.get(field) {
            None => Ok(None),
            Some(v) => v.as_i64().map(Some).ok_or_else(|| self.wrong_type(field, "an integer", v)),
        }
    }

    fn i64_required(&self, field: &'static str) -> Result<i64, DecodeError> {
        self.i64_opt(field)?.ok_or_else(|| self.missing(field))
    }

    fn u64_or_zero(&self, field: &'static str) -> Result<u64, DecodeError> {
        match self.get(field) {
            None => Ok(0),
            Some(v) => v.as_u64().ok_or_else(|| self.wrong_type(field, "a non-negative integer", v)),
        }
    }

    fn bool_or_false(&self, field: &'static str) -> Result<bool, DecodeError> {
        match self.get(field) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.wrong_type(field, "a boolean", other)),
        }
    }

    fn timestamp(&self, field: &'static str) -> Result<OffsetDateTime, DecodeError> {
        let s = self.str_required(field)?;
        parse_timestamp(s).map_err(|e| self.invalid(field, format!("bad timestamp {s:?}: {e}")))
    }

    fn str_list(&self, field: &'static str) -> Result<Vec<String>, DecodeError> {
        match self.get(field) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(self.wrong_type(field, "an array of strings", other)),
                })
                .collect(),
            Some(other) => Err(self.wrong_type(field, "an array", other)),
        }
    }

    fn vote(&self, field: &'static str) -> Result<Vote, DecodeError> {
        match self.str_opt(field)?.as_deref() {
            None | Some("NONE") => Ok(Vote::None),
            Some("UP") => Ok(Vote::Up),
            Some("DOWN") => Ok(Vote::Down),
            Some(other) => Err(self.invalid(field, format!("unknown vote {other:?}"))),
        }
    }

    fn video_state(&self, field: &'static str) -> Result<VideoState, DecodeError> {
        match self.str_opt(field)?.as_deref() {
            None | Some("NONE") => Ok(VideoState::None),
            Some("READY") => Ok(VideoState::Ready),
            Some("PROCESSING") => Ok(VideoState::Processing),
            Some("FAILED") => Ok(VideoState::Failed),
            Some(other) => Err(self.invalid(field, format!("unknown video state {other:?}"))),
        }
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
