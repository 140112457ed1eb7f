use crate::error::{AppError, Result};
use crate::helpers::enrichment::enrich_videos;
use crate::helpers::pagination::{PageRequest, Pagination};
use crate::models::{
    CreatedVideo, EnrichedVideo, Interaction, InteractionKind, MetaItemPayload, NewInteraction,
    NewVideo,
};
use crate::store::{StoreError, VideoStore};

/// Stores a video and its meta items in one unit and returns both with the
/// owner populated.
pub fn create_video(
    store: &dyn VideoStore,
    video: NewVideo,
    meta_items: Vec<MetaItemPayload>,
) -> Result<CreatedVideo> {
    let owner_id = video.user_id;
    let (video, meta_items) = store
        .create_video_with_meta_items(video, meta_items)
        .map_err(|e| match e {
            // The token outlived its user.
            StoreError::NotFound(_) => AppError::Auth(format!("User {} does not exist", owner_id)),
            other => other.into(),
        })?;

    tracing::info!(video_id = video.id, user_id = owner_id, meta_items = meta_items.len(), "Video created");

    Ok(CreatedVideo { video, meta_items })
}

/// Loads one page of videos with meta items and interaction counts attached.
/// Related rows are fetched with one batched query each, never per video.
pub fn list_videos(store: &dyn VideoStore, request: PageRequest) -> Result<(Vec<EnrichedVideo>, Pagination)> {
    let page = store.list_videos_page(request.offset(), request.limit)?;
    let video_ids: Vec<i32> = page.iter().map(|video| video.id).collect();

    let meta_items = store.find_meta_items_by_video_ids(&video_ids)?;
    let counts = store.group_interaction_counts(&video_ids)?;
    let total_items = store.count_videos()?;

    Ok((
        enrich_videos(page, meta_items, counts),
        Pagination::new(request, total_items),
    ))
}

pub fn record_interaction(
    store: &dyn VideoStore,
    user_id: i32,
    video_id: i32,
    kind: InteractionKind,
    content: Option<String>,
) -> Result<Interaction> {
    let interaction = store
        .record_interaction(NewInteraction::new(user_id, video_id, kind, content))
        .map_err(|e| match e {
            StoreError::UniqueViolation(_) => {
                AppError::Conflict(format!("Video {} already has a {} from this user", video_id, kind))
            }
            // Either the video or the caller is gone; a stale token is an auth failure.
            StoreError::NotFound(_) => match store.find_user(user_id) {
                Ok(None) => AppError::Auth(format!("User {} does not exist", user_id)),
                Ok(Some(_)) => AppError::NotFound(format!("Video {} not found", video_id)),
                Err(e) => e.into(),
            },
            other => other.into(),
        })?;

    tracing::debug!(video_id, user_id, %kind, "Interaction recorded");

    Ok(interaction)
}
