use std::collections::HashMap;

use crate::models::{EnrichedVideo, InteractionCount, InteractionKind, InteractionStats, MetaItem, VideoWithUser};

/// Merges a page of videos with their meta items and grouped interaction
/// counts. Page order is preserved and every video is kept, whether or not
/// anything refers to it.
pub fn enrich_videos(
    page: Vec<VideoWithUser>,
    meta_items: Vec<MetaItem>,
    counts: Vec<InteractionCount>,
) -> Vec<EnrichedVideo> {
    let mut items_by_video: HashMap<i32, Vec<MetaItem>> = HashMap::new();
    for item in meta_items {
        items_by_video.entry(item.video_id).or_default().push(item);
    }

    let mut stats_by_video: HashMap<i32, InteractionStats> = HashMap::new();
    for row in counts {
        match row.interaction_type.parse::<InteractionKind>() {
            Ok(kind) => stats_by_video
                .entry(row.video_id)
                .or_default()
                .set(kind, row.count),
            Err(e) => tracing::warn!(video_id = row.video_id, "Skipping interaction count: {}", e),
        }
    }

    page.into_iter()
        .map(|video| EnrichedVideo {
            meta_items: items_by_video.remove(&video.id).unwrap_or_default(),
            interactions: stats_by_video.remove(&video.id).unwrap_or_default(),
            video,
        })
        .collect()
}
