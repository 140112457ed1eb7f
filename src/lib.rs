use std::sync::Arc;

use actix_web::web;

use crate::config::{AuthMode, Config, ConfigError, StoreBackend};
use crate::error::StartupError;
use crate::middleware::auth::{CheckLogin, FixedPrincipal, JwtResolver, Principal, PrincipalResolver};
use crate::store::{MemoryStore, PgStore, VideoStore};

pub mod claims;
pub mod config;
pub mod error;
pub mod helpers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod schema;
pub mod store;
pub mod telemetry;

/// Shared by every handler. The store is built once at startup and injected
/// here rather than reached through a global.
pub struct AppState {
    pub store: Arc<dyn VideoStore>,
}

pub fn build_store(config: &Config) -> Result<Arc<dyn VideoStore>, StartupError> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let store = PgStore::connect(url, config.db_pool_size)?;
            let applied = store.run_migrations()?;
            tracing::info!(applied, pool_size = config.db_pool_size, "PostgreSQL connected");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub fn build_resolver(
    config: &Config,
    store: &dyn VideoStore,
) -> Result<Arc<dyn PrincipalResolver>, StartupError> {
    match config.auth_mode {
        AuthMode::Jwt => {
            let secret = config
                .jwt_secret
                .as_deref()
                .ok_or(ConfigError::Missing("JWT_SECRET"))?;
            Ok(Arc::new(JwtResolver::new(secret)))
        }
        AuthMode::Fixed => {
            let user = helpers::users::get_or_create_user(store, &config.fixed_username)?;
            tracing::warn!(user_id = user.id, username = %user.username, "AUTH_MODE=fixed, every request runs as this user");
            Ok(Arc::new(FixedPrincipal(Principal::from(&user))))
        }
    }
}

/// Registers the API on an `App`.
pub fn configure(
    store: Arc<dyn VideoStore>,
    resolver: Arc<dyn PrincipalResolver>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(AppState { store }))
            .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
            .service(routes::health::health)
            .service(
                web::scope("/api/videos")
                    .wrap(CheckLogin::new(resolver))
                    .service(routes::video::create_video)
                    .service(routes::video::get_videos)
                    .service(routes::interactions::record_interaction),
            )
            .default_service(web::to(routes::not_found));
    }
}
