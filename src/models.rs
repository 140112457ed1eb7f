use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::helpers::pagination::Pagination;
use crate::schema::interactions;
use crate::schema::meta_items;
use crate::schema::users;
use crate::schema::videos;

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = users)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub avatar_url: &'a str,
}

/// The owner fields that are safe to hand out next to a video.
#[derive(Queryable, Selectable, Serialize, Clone, Debug, PartialEq)]
#[diesel(table_name = users)]
#[serde(rename_all = "camelCase")]
pub struct SafeUser {
    pub id: i32,
    pub username: String,
    pub avatar_url: String,
}

impl From<&User> for SafeUser {
    fn from(user: &User) -> Self {
        SafeUser {
            id: user.id,
            username: user.username.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = videos)]
pub struct Video {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = videos)]
pub struct NewVideo {
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub user_id: i32,
}

/// A video with its owner populated in place of the bare user id.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VideoWithUser {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub user: SafeUser,
    pub created_at: DateTime<Utc>,
}

impl VideoWithUser {
    pub fn from_parts(video: Video, user: SafeUser) -> Self {
        VideoWithUser {
            id: video.id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            user,
            created_at: video.created_at,
        }
    }
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug, PartialEq)]
#[diesel(table_name = meta_items)]
#[serde(rename_all = "camelCase")]
pub struct MetaItem {
    pub id: i32,
    pub video_id: i32,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    #[serde(rename = "key")]
    pub item_key: Option<String>,
    #[serde(rename = "value")]
    pub item_value: Option<String>,
    pub thumbnail_url: Option<String>,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = meta_items)]
pub struct NewMetaItem {
    pub video_id: i32,
    pub item_type: Option<String>,
    pub item_key: Option<String>,
    pub item_value: Option<String>,
    pub thumbnail_url: Option<String>,
    pub label: Option<String>,
}

/// A meta item as submitted alongside a new video. Unrecognised fields are
/// ignored; the video reference is always taken from the created video.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetaItemPayload {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub key: Option<String>,
    pub value: Option<String>,
    pub thumbnail_url: Option<String>,
    pub label: Option<String>,
}

impl MetaItemPayload {
    pub fn is_empty(&self) -> bool {
        [
            &self.item_type,
            &self.key,
            &self.value,
            &self.thumbnail_url,
            &self.label,
        ]
        .iter()
        .all(|field| field.as_deref().map_or(true, |v| v.trim().is_empty()))
    }

    pub fn into_new(self, video_id: i32) -> NewMetaItem {
        NewMetaItem {
            video_id,
            item_type: self.item_type,
            item_key: self.key,
            item_value: self.value,
            thumbnail_url: self.thumbnail_url,
            label: self.label,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Like,
    View,
    Comment,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::View => "view",
            InteractionKind::Comment => "comment",
        }
    }

    /// Likes and views count once per user and video.
    pub fn is_once_per_user(&self) -> bool {
        matches!(self, InteractionKind::Like | InteractionKind::View)
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(InteractionKind::Like),
            "view" => Ok(InteractionKind::View),
            "comment" => Ok(InteractionKind::Comment),
            other => Err(format!("Unknown interaction type '{}'", other)),
        }
    }
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = interactions)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: i32,
    pub user_id: i32,
    pub video_id: i32,
    #[serde(rename = "type")]
    pub interaction_type: String,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = interactions)]
pub struct NewInteraction {
    pub user_id: i32,
    pub video_id: i32,
    pub interaction_type: String,
    pub content: Option<String>,
}

impl NewInteraction {
    pub fn new(user_id: i32, video_id: i32, kind: InteractionKind, content: Option<String>) -> Self {
        NewInteraction {
            user_id,
            video_id,
            interaction_type: kind.as_str().to_string(),
            content,
        }
    }
}

/// One row of the grouped (video, type) interaction count.
#[derive(Queryable, Clone, Debug, PartialEq)]
pub struct InteractionCount {
    pub video_id: i32,
    pub interaction_type: String,
    pub count: i64,
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteractionStats {
    pub likes: i64,
    pub views: i64,
    pub comments: i64,
}

impl InteractionStats {
    pub fn set(&mut self, kind: InteractionKind, count: i64) {
        match kind {
            InteractionKind::Like => self.likes = count,
            InteractionKind::View => self.views = count,
            InteractionKind::Comment => self.comments = count,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreatedVideo {
    #[serde(flatten)]
    pub video: VideoWithUser,
    pub meta_items: Vec<MetaItem>,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedVideo {
    #[serde(flatten)]
    pub video: VideoWithUser,
    pub meta_items: Vec<MetaItem>,
    pub interactions: InteractionStats,
}

/// Envelope shared by every response body.
#[derive(Serialize, Debug)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        ApiResponse {
            success: true,
            message: None,
            data: Some(data),
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(success: bool, message: impl Into<String>) -> Self {
        ApiResponse {
            success,
            message: Some(message.into()),
            data: None,
            pagination: None,
        }
    }
}
