use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::models::{
    Interaction, InteractionCount, MetaItem, MetaItemPayload, NewInteraction, NewVideo, User,
    VideoWithUser,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(DieselError),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("duplicate entry: {0}")]
    UniqueViolation(String),
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => StoreError::NotFound("record".into()),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::UniqueViolation(info.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                StoreError::NotFound(info.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
                StoreError::Constraint(info.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the video endpoints need from a backing store. Calls block, so
/// request handlers run them inside `web::block`.
pub trait VideoStore: Send + Sync {
    /// Inserts the video and its meta items as one unit: either all rows
    /// become visible or none do.
    fn create_video_with_meta_items(
        &self,
        video: NewVideo,
        meta_items: Vec<MetaItemPayload>,
    ) -> StoreResult<(VideoWithUser, Vec<MetaItem>)>;

    /// One page of videos, newest first, with owners populated.
    fn list_videos_page(&self, offset: i64, limit: i64) -> StoreResult<Vec<VideoWithUser>>;

    fn find_meta_items_by_video_ids(&self, video_ids: &[i32]) -> StoreResult<Vec<MetaItem>>;

    /// Interaction counts grouped by (video, type) for the given videos.
    fn group_interaction_counts(&self, video_ids: &[i32]) -> StoreResult<Vec<InteractionCount>>;

    fn count_videos(&self) -> StoreResult<i64>;

    fn find_user(&self, user_id: i32) -> StoreResult<Option<User>>;

    fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Returns the user with this username, creating it first if needed.
    fn ensure_user(&self, username: &str, avatar_url: &str) -> StoreResult<User>;

    /// Fails with `UniqueViolation` on a second like or view from the same
    /// user on the same video.
    fn record_interaction(&self, interaction: NewInteraction) -> StoreResult<Interaction>;

    /// Removes every row. Used by the seeder.
    fn clear(&self) -> StoreResult<()>;
}
