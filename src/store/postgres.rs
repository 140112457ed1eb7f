use diesel::dsl::count_star;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use super::{StoreError, StoreResult, VideoStore};
use crate::models::{
    Interaction, InteractionCount, MetaItem, MetaItemPayload, NewInteraction, NewMetaItem,
    NewUser, NewVideo, SafeUser, User, Video, VideoWithUser,
};
use crate::schema::{interactions, meta_items, users, videos};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub fn establish_pool(database_url: &str, max_size: u32) -> StoreResult<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder().max_size(max_size).build(manager)?;
    Ok(pool)
}

/// Relational backend over a pooled postgres connection.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        PgStore { pool }
    }

    pub fn connect(database_url: &str, max_size: u32) -> StoreResult<Self> {
        Ok(PgStore::new(establish_pool(database_url, max_size)?))
    }

    fn conn(&self) -> StoreResult<PooledConnection<ConnectionManager<PgConnection>>> {
        Ok(self.pool.get()?)
    }

    pub fn run_migrations(&self) -> StoreResult<usize> {
        let mut conn = self.conn()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        for version in &applied {
            tracing::info!(%version, "Applied migration");
        }

        Ok(applied.len())
    }
}

impl VideoStore for PgStore {
    fn create_video_with_meta_items(
        &self,
        new_video: NewVideo,
        payloads: Vec<MetaItemPayload>,
    ) -> StoreResult<(VideoWithUser, Vec<MetaItem>)> {
        let mut conn = self.conn()?;

        conn.transaction::<_, StoreError, _>(|conn| {
            let video: Video = diesel::insert_into(videos::table)
                .values(&new_video)
                .returning(Video::as_returning())
                .get_result(conn)?;

            let rows: Vec<NewMetaItem> = payloads
                .into_iter()
                .map(|payload| payload.into_new(video.id))
                .collect();

            let items: Vec<MetaItem> = if rows.is_empty() {
                Vec::new()
            } else {
                diesel::insert_into(meta_items::table)
                    .values(&rows)
                    .returning(MetaItem::as_returning())
                    .get_results(conn)?
            };

            let owner: SafeUser = users::table
                .find(video.user_id)
                .select(SafeUser::as_select())
                .first(conn)?;

            Ok((VideoWithUser::from_parts(video, owner), items))
        })
    }

    fn list_videos_page(&self, offset: i64, limit: i64) -> StoreResult<Vec<VideoWithUser>> {
        let mut conn = self.conn()?;

        let rows: Vec<(Video, SafeUser)> = videos::table
            .inner_join(users::table)
            .select((Video::as_select(), SafeUser::as_select()))
            .order((videos::created_at.desc(), videos::id.desc()))
            .offset(offset)
            .limit(limit)
            .load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(video, owner)| VideoWithUser::from_parts(video, owner))
            .collect())
    }

    fn find_meta_items_by_video_ids(&self, video_ids: &[i32]) -> StoreResult<Vec<MetaItem>> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let items = meta_items::table
            .filter(meta_items::video_id.eq_any(video_ids.to_vec()))
            .order(meta_items::id.asc())
            .select(MetaItem::as_select())
            .load(&mut conn)?;

        Ok(items)
    }

    fn group_interaction_counts(&self, video_ids: &[i32]) -> StoreResult<Vec<InteractionCount>> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let counts = interactions::table
            .filter(interactions::video_id.eq_any(video_ids.to_vec()))
            .group_by((interactions::video_id, interactions::interaction_type))
            .select((
                interactions::video_id,
                interactions::interaction_type,
                count_star(),
            ))
            .load::<InteractionCount>(&mut conn)?;

        Ok(counts)
    }

    fn count_videos(&self) -> StoreResult<i64> {
        let mut conn = self.conn()?;
        Ok(videos::table.count().get_result(&mut conn)?)
    }

    fn find_user(&self, user_id: i32) -> StoreResult<Option<User>> {
        let mut conn = self.conn()?;
        let user = users::table
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(user)
    }

    fn find_user_by_username(&self, name: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::username.eq(name))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(user)
    }

    fn ensure_user(&self, name: &str, avatar_url: &str) -> StoreResult<User> {
        let mut conn = self.conn()?;

        diesel::insert_into(users::table)
            .values(&NewUser {
                username: name,
                avatar_url,
            })
            .on_conflict(users::username)
            .do_nothing()
            .execute(&mut conn)?;

        let user = users::table
            .filter(users::username.eq(name))
            .select(User::as_select())
            .first(&mut conn)?;

        Ok(user)
    }

    fn record_interaction(&self, interaction: NewInteraction) -> StoreResult<Interaction> {
        let mut conn = self.conn()?;
        let stored = diesel::insert_into(interactions::table)
            .values(&interaction)
            .returning(Interaction::as_returning())
            .get_result(&mut conn)?;

        Ok(stored)
    }

    fn clear(&self) -> StoreResult<()> {
        let mut conn = self.conn()?;

        conn.transaction::<_, StoreError, _>(|conn| {
            diesel::delete(interactions::table).execute(conn)?;
            diesel::delete(meta_items::table).execute(conn)?;
            diesel::delete(videos::table).execute(conn)?;
            diesel::delete(users::table).execute(conn)?;
            Ok(())
        })
    }
}
