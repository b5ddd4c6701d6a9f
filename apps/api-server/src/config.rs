//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "mongo")]
use memoir_infra::MongoConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// JSON file used when the document store is unavailable.
    pub posts_file: PathBuf,
    pub file_io_timeout: Duration,
    #[cfg(feature = "mongo")]
    pub mongo: MongoConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            posts_file: env::var("POSTS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("posts.json")),
            file_io_timeout: Duration::from_secs(
                env::var("FILE_IO_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            #[cfg(feature = "mongo")]
            mongo: MongoConfig::from_env(),
        }
    }
}
