use crate::models::{InteractionKind, MetaItemPayload, NewInteraction, NewVideo};
use crate::store::{StoreResult, VideoStore};

const USERS: [(&str, &str); 4] = [
    ("john_doe", "https://picsum.photos/150/150?random=1"),
    ("jane_smith", "https://picsum.photos/150/150?random=2"),
    ("bob_wilson", "https://picsum.photos/150/150?random=3"),
    ("alice_johnson", "https://picsum.photos/150/150?random=4"),
];

// (title, description, url, owner index)
const VIDEOS: [(&str, &str, &str, usize); 5] = [
    (
        "Amazing Nature Documentary",
        "Explore the wonders of wildlife in this stunning documentary",
        "https://sample-videos.com/zip/10/mp4/SampleVideo_1280x720_1mb.mp4",
        0,
    ),
    (
        "Cooking Tutorial: Italian Pasta",
        "Learn how to make authentic Italian pasta from scratch",
        "https://sample-videos.com/zip/10/mp4/SampleVideo_1280x720_2mb.mp4",
        1,
    ),
    (
        "Travel Vlog: Tokyo Adventure",
        "Join me as I explore the vibrant streets of Tokyo",
        "https://sample-videos.com/zip/10/mp4/SampleVideo_1280x720_5mb.mp4",
        2,
    ),
    (
        "Tech Review: Latest Smartphone",
        "Comprehensive review of the newest smartphone features",
        "https://sample-videos.com/zip/10/mp4/SampleVideo_1280x720_1mb.mp4",
        0,
    ),
    (
        "Fitness Workout: Morning Routine",
        "Start your day with this energizing 20-minute workout",
        "https://sample-videos.com/zip/10/mp4/SampleVideo_1280x720_2mb.mp4",
        3,
    ),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub videos: usize,
    pub meta_items: usize,
    pub interactions: usize,
}

fn thumbnails(index: usize) -> Vec<MetaItemPayload> {
    vec![
        MetaItemPayload {
            item_type: Some("thumbnail".into()),
            thumbnail_url: Some(format!("https://picsum.photos/320/180?random={}", index * 2 + 10)),
            label: Some(format!("Thumbnail {}", index + 1)),
            ..Default::default()
        },
        MetaItemPayload {
            item_type: Some("preview".into()),
            thumbnail_url: Some(format!("https://picsum.photos/320/180?random={}", index * 2 + 11)),
            label: Some(format!("Preview {}", index + 1)),
            ..Default::default()
        },
    ]
}

/// Wipes the store and fills it with demo users, videos, meta items and
/// interactions.
pub fn seed(store: &dyn VideoStore) -> StoreResult<SeedSummary> {
    store.clear()?;
    tracing::info!("Cleared existing data");

    let mut summary = SeedSummary::default();

    let mut users = Vec::with_capacity(USERS.len());
    for (username, avatar_url) in USERS {
        users.push(store.ensure_user(username, avatar_url)?);
    }
    summary.users = users.len();

    let mut video_ids = Vec::with_capacity(VIDEOS.len());
    for (index, (title, description, url, owner)) in VIDEOS.into_iter().enumerate() {
        let (video, items) = store.create_video_with_meta_items(
            NewVideo {
                title: title.to_string(),
                description: Some(description.to_string()),
                video_url: url.to_string(),
                user_id: users[owner].id,
            },
            thumbnails(index),
        )?;
        summary.meta_items += items.len();
        video_ids.push(video.id);
    }
    summary.videos = video_ids.len();

    for video_id in &video_ids {
        for (index, user) in users.iter().enumerate() {
            store.record_interaction(NewInteraction::new(user.id, *video_id, InteractionKind::View, None))?;
            summary.interactions += 1;

            if index % 2 == 0 {
                store.record_interaction(NewInteraction::new(user.id, *video_id, InteractionKind::Like, None))?;
                summary.interactions += 1;
            }

            if index < 2 {
                let content = format!("Great video! This is a comment from {}", user.username);
                store.record_interaction(NewInteraction::new(
                    user.id,
                    *video_id,
                    InteractionKind::Comment,
                    Some(content),
                ))?;
                summary.interactions += 1;
            }
        }
    }

    tracing::info!(
        users = summary.users,
        videos = summary.videos,
        meta_items = summary.meta_items,
        interactions = summary.interactions,
        "Database seeded"
    );

    Ok(summary)
}
