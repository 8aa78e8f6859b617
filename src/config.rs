//! Configuration module
//!
//! Settings come from the environment, with defaults suitable for local
//! development.

use std::str::FromStr;

use tracing::warn;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://./sports_articles.db?mode=rwc";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// SeaORM connection URL
    pub database_url: String,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Articles inserted by the seed binary
    pub seed_count: usize,
}

impl AppConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", lookup("PORT"), defaults.port),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            seed_count: parse_or("SEED_COUNT", lookup("SEED_COUNT"), defaults.seed_count),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}", key, value);
            default
        }),
        None => default,
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_level: "info".to_string(),
            seed_count: 150,
        }
    }
}
