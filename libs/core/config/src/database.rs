use crate::{env_parse, env_required, ConfigError, FromEnv};

/// Postgres connection settings for the activity and preference store
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
        }
    }
}

impl FromEnv for DatabaseConfig {
    /// Requires DATABASE_URL; DATABASE_MAX_CONNECTIONS defaults to 10
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_required("DATABASE_URL")?,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 10)?,
        })
    }
}
