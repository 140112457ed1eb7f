use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    Jwt,
    /// Every request runs as one configured user. Development only.
    Fixed,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_pool_size: u32,
    pub cors_origin: Option<String>,
    pub auth_mode: AuthMode,
    pub jwt_secret: Option<String>,
    pub fixed_username: String,
}

fn var(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

impl Config {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick
    /// up a local `.env` file. `DATABASE_URL` and `JWT_SECRET` are only
    /// demanded by the parts that use them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_backend = match var("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let auth_mode = match var("AUTH_MODE").as_deref() {
            None | Some("jwt") => AuthMode::Jwt,
            Some("fixed") => AuthMode::Fixed,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "AUTH_MODE",
                    value: other.to_string(),
                })
            }
        };

        Ok(Config {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parsed("PORT", 8000)?,
            store_backend,
            database_url: var("DATABASE_URL"),
            db_pool_size: parsed("DB_POOL_SIZE", 10)?,
            cors_origin: var("CORS_ORIGIN").filter(|origin| origin != "*"),
            auth_mode,
            jwt_secret: var("JWT_SECRET"),
            fixed_username: var("FIXED_USERNAME").unwrap_or_else(|| "john_doe".to_string()),
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
