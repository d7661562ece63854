//! Environment-sourced configuration
//!
//! All knobs come from the environment (dotenvy loads `.env` in main)
//! with defaults matching the deployed setup.

use std::env;

/// Default marker TTL in seconds (5 minutes; 2 minutes in docker-compose)
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default price feed request timeout in seconds
const DEFAULT_FEED_TIMEOUT_SECS: u64 = 30;

/// Default HTTP listen port
const DEFAULT_PORT: u16 = 8000;

/// Default interval between item mapping re-syncs (24 hours)
const DEFAULT_MAPPING_SYNC_INTERVAL_SECS: u64 = 86400;

/// Default base URL for the runescape.wiki price API
const DEFAULT_FEED_BASE_URL: &str = "https://prices.runescape.wiki/api/v1/osrs";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub cache_ttl_secs: u64,
    pub feed_timeout_secs: u64,
    pub feed_base_url: String,
    /// The feed host has had certificate hiccups; allow opting out of
    /// verification for that client only
    pub feed_accept_invalid_certs: bool,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub mapping_sync_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set")?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database_url,
            cache_ttl_secs: env_parse("CACHE_TTL", DEFAULT_CACHE_TTL_SECS),
            feed_timeout_secs: env_parse("FEED_TIMEOUT", DEFAULT_FEED_TIMEOUT_SECS),
            feed_base_url: env::var("FEED_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_FEED_BASE_URL.to_string()),
            feed_accept_invalid_certs: env::var("FEED_ACCEPT_INVALID_CERTS")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
            port: env_parse("PORT", DEFAULT_PORT),
            cors_origins,
            mapping_sync_interval_secs: env_parse(
                "MAPPING_SYNC_INTERVAL_SECS",
                DEFAULT_MAPPING_SYNC_INTERVAL_SECS,
            ),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
