//! Application state - shared across all handlers.

use std::sync::Arc;

use memoir_core::StorageSelector;
use memoir_core::error::RepoError;
use memoir_infra::JsonFilePostRepository;

#[cfg(feature = "mongo")]
use memoir_infra::MongoPostRepository;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<StorageSelector>,
}

impl AppState {
    pub fn new(posts: StorageSelector) -> Self {
        Self {
            posts: Arc::new(posts),
        }
    }

    /// Build the state from configuration. Only a file store that cannot be
    /// initialized is fatal; a bad document store config falls back to file.
    pub async fn from_config(config: &AppConfig) -> Result<Self, RepoError> {
        let file =
            JsonFilePostRepository::open_with_timeout(&config.posts_file, config.file_io_timeout)
                .await?;
        tracing::info!(path = %file.path().display(), "Local file storage ready");

        let selector = StorageSelector::new(Arc::new(file));

        #[cfg(feature = "mongo")]
        let selector = match MongoPostRepository::new(config.mongo.clone()).await {
            Ok(repo) => {
                let repo = Arc::new(repo);
                selector.with_networked(repo.clone(), repo)
            }
            Err(e) => {
                tracing::error!(error = %e, "Invalid MongoDB configuration. Using local file storage.");
                selector
            }
        };

        #[cfg(not(feature = "mongo"))]
        tracing::info!("Running without mongo feature - using local file storage only");

        Ok(Self::new(selector))
    }

    /// Run the document store handshake without delaying server startup.
    pub fn connect_in_background(&self) {
        let posts = self.posts.clone();
        actix_rt::spawn(async move {
            posts.connect().await;
        });
    }
}
