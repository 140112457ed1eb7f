use std::collections::{HashMap, HashSet};

use chrono::Utc;
use parking_lot::RwLock;

use super::{StoreError, StoreResult, VideoStore};
use crate::models::{
    Interaction, InteractionCount, InteractionKind, MetaItem, MetaItemPayload, NewInteraction,
    NewVideo, SafeUser, User, Video, VideoWithUser,
};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    videos: Vec<Video>,
    meta_items: Vec<MetaItem>,
    interactions: Vec<Interaction>,
    next_user_id: i32,
    next_video_id: i32,
    next_meta_item_id: i32,
    next_interaction_id: i32,
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

impl Collections {
    fn owner(&self, user_id: i32) -> StoreResult<SafeUser> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(SafeUser::from)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))
    }
}

/// Document-style backend that keeps every collection in process memory.
/// Each write runs under a single lock, so multi-row writes are atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl VideoStore for MemoryStore {
    fn create_video_with_meta_items(
        &self,
        new_video: NewVideo,
        payloads: Vec<MetaItemPayload>,
    ) -> StoreResult<(VideoWithUser, Vec<MetaItem>)> {
        let mut data = self.inner.write();
        let owner = data.owner(new_video.user_id)?;

        let now = Utc::now();
        let video = Video {
            id: next_id(&mut data.next_video_id),
            title: new_video.title,
            description: new_video.description,
            video_url: new_video.video_url,
            user_id: new_video.user_id,
            created_at: now,
        };

        let mut items = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let row = payload.into_new(video.id);
            items.push(MetaItem {
                id: next_id(&mut data.next_meta_item_id),
                video_id: row.video_id,
                item_type: row.item_type,
                item_key: row.item_key,
                item_value: row.item_value,
                thumbnail_url: row.thumbnail_url,
                label: row.label,
                created_at: now,
            });
        }

        data.videos.push(video.clone());
        data.meta_items.extend(items.iter().cloned());

        Ok((VideoWithUser::from_parts(video, owner), items))
    }

    fn list_videos_page(&self, offset: i64, limit: i64) -> StoreResult<Vec<VideoWithUser>> {
        let data = self.inner.read();

        let mut ordered: Vec<&Video> = data.videos.iter().collect();
        ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        ordered
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|video| Ok(VideoWithUser::from_parts(video.clone(), data.owner(video.user_id)?)))
            .collect()
    }

    fn find_meta_items_by_video_ids(&self, video_ids: &[i32]) -> StoreResult<Vec<MetaItem>> {
        let wanted: HashSet<i32> = video_ids.iter().copied().collect();
        let data = self.inner.read();

        Ok(data
            .meta_items
            .iter()
            .filter(|item| wanted.contains(&item.video_id))
            .cloned()
            .collect())
    }

    fn group_interaction_counts(&self, video_ids: &[i32]) -> StoreResult<Vec<InteractionCount>> {
        let wanted: HashSet<i32> = video_ids.iter().copied().collect();
        let data = self.inner.read();

        let mut groups: HashMap<(i32, &str), i64> = HashMap::new();
        for interaction in data.interactions.iter().filter(|i| wanted.contains(&i.video_id)) {
            *groups
                .entry((interaction.video_id, interaction.interaction_type.as_str()))
                .or_insert(0) += 1;
        }

        Ok(groups
            .into_iter()
            .map(|((video_id, kind), count)| InteractionCount {
                video_id,
                interaction_type: kind.to_string(),
                count,
            })
            .collect())
    }

    fn count_videos(&self) -> StoreResult<i64> {
        Ok(self.inner.read().videos.len() as i64)
    }

    fn find_user(&self, user_id: i32) -> StoreResult<Option<User>> {
        Ok(self.inner.read().users.iter().find(|u| u.id == user_id).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .inner
            .read()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    fn ensure_user(&self, username: &str, avatar_url: &str) -> StoreResult<User> {
        let mut data = self.inner.write();

        if let Some(existing) = data.users.iter().find(|u| u.username == username) {
            return Ok(existing.clone());
        }

        let user = User {
            id: next_id(&mut data.next_user_id),
            username: username.to_string(),
            avatar_url: avatar_url.to_string(),
            created_at: Utc::now(),
        };
        data.users.push(user.clone());

        Ok(user)
    }

    fn record_interaction(&self, interaction: NewInteraction) -> StoreResult<Interaction> {
        let mut data = self.inner.write();

        if !data.videos.iter().any(|v| v.id == interaction.video_id) {
            return Err(StoreError::NotFound(format!("video {}", interaction.video_id)));
        }
        if !data.users.iter().any(|u| u.id == interaction.user_id) {
            return Err(StoreError::NotFound(format!("user {}", interaction.user_id)));
        }

        let kind: InteractionKind = interaction
            .interaction_type
            .parse()
            .map_err(StoreError::Constraint)?;

        if kind.is_once_per_user()
            && data.interactions.iter().any(|existing| {
                existing.user_id == interaction.user_id
                    && existing.video_id == interaction.video_id
                    && existing.interaction_type == interaction.interaction_type
            })
        {
            return Err(StoreError::UniqueViolation(format!(
                "user {} already recorded a {} on video {}",
                interaction.user_id, kind, interaction.video_id
            )));
        }

        let stored = Interaction {
            id: next_id(&mut data.next_interaction_id),
            user_id: interaction.user_id,
            video_id: interaction.video_id,
            interaction_type: interaction.interaction_type,
            content: interaction.content,
            created_at: Utc::now(),
        };
        data.interactions.push(stored.clone());

        Ok(stored)
    }

    fn clear(&self) -> StoreResult<()> {
        *self.inner.write() = Collections::default();
        Ok(())
    }
}
