use crate::models::User;
use crate::store::{StoreResult, VideoStore};

pub const DEFAULT_AVATAR_URL: &str = "https://picsum.photos/150/150";

/// Returns the user with this username, creating it with the default avatar
/// when it does not exist yet.
pub fn get_or_create_user(store: &dyn VideoStore, username: &str) -> StoreResult<User> {
    match store.find_user_by_username(username)? {
        Some(user) => Ok(user),
        None => {
            tracing::info!(username, "Creating user");
            store.ensure_user(username, DEFAULT_AVATAR_URL)
        }
    }
}
