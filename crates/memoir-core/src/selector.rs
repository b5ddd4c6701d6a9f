//! Storage selector - routes each call to the networked store or the file store.
//!
//! The selector holds an explicit [`ConnectionState`] that moves to
//! `Connected` at most once, after a successful startup handshake. Being
//! connected is necessary but not sufficient: every call also runs a live
//! readiness check, so a document store that drops after startup is bypassed
//! until it recovers. Whatever backend answers, records leave the selector as
//! [`PostView`]s.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::domain::{Category, NewPost, PostPatch, PostView};
use crate::error::DomainError;
use crate::ports::{Connectivity, PostRepository};

/// The backend chosen for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Networked,
    File,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Networked => f.write_str("networked"),
            Backend::File => f.write_str("file"),
        }
    }
}

/// Outcome of the startup handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
}

/// Connection state owned by a selector. Starts `Disconnected`.
#[derive(Debug, Default)]
pub struct ConnectionState {
    connected: AtomicBool,
}

impl ConnectionState {
    pub fn get(&self) -> LinkState {
        if self.connected.load(Ordering::Acquire) {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        }
    }

    fn mark_connected(&self) {
        self.connected.store(true, Ordering::Release);
    }
}

struct Networked {
    repo: Arc<dyn PostRepository>,
    link: Arc<dyn Connectivity>,
}

/// Facade over the two post backends.
pub struct StorageSelector {
    networked: Option<Networked>,
    fallback: Arc<dyn PostRepository>,
    state: ConnectionState,
}

impl StorageSelector {
    /// Selector that serves everything from `fallback` until a networked
    /// backend is attached and connected.
    pub fn new(fallback: Arc<dyn PostRepository>) -> Self {
        Self {
            networked: None,
            fallback,
            state: ConnectionState::default(),
        }
    }

    /// Attach the networked backend and its connectivity probe.
    pub fn with_networked(
        mut self,
        repo: Arc<dyn PostRepository>,
        link: Arc<dyn Connectivity>,
    ) -> Self {
        self.networked = Some(Networked { repo, link });
        self
    }

    /// Run the startup handshake. Only a success changes state; after a
    /// failure the selector keeps serving from the file store.
    pub async fn connect(&self) -> LinkState {
        let Some(networked) = &self.networked else {
            tracing::info!("No networked backend configured - using local file storage");
            return self.state.get();
        };

        match networked.link.connect().await {
            Ok(()) => {
                self.state.mark_connected();
                tracing::info!("Connected to networked document store");
            }
            Err(e) => {
                tracing::error!(error = %e, "Document store connection failed");
                tracing::warn!("Using local file storage as fallback");
            }
        }

        self.state.get()
    }

    pub fn state(&self) -> LinkState {
        self.state.get()
    }

    /// The backend that would serve a call issued now.
    pub async fn active_backend(&self) -> Backend {
        self.route().await.0
    }

    async fn route(&self) -> (Backend, &dyn PostRepository) {
        if let Some(networked) = &self.networked {
            if self.state.get() == LinkState::Connected {
                if networked.link.is_ready().await {
                    return (Backend::Networked, networked.repo.as_ref());
                }
                tracing::warn!("Document store not ready - routing to file storage");
            }
        }
        (Backend::File, self.fallback.as_ref())
    }

    /// All posts, newest first.
    pub async fn list(&self) -> Result<Vec<PostView>, DomainError> {
        let (backend, repo) = self.route().await;
        let posts = repo.list().await?;
        tracing::debug!(%backend, count = posts.len(), "Listed posts");
        Ok(posts.into_iter().map(PostView::from).collect())
    }

    /// A single post, or `None` when the id is unknown.
    pub async fn get(&self, id: &str) -> Result<Option<PostView>, DomainError> {
        let (backend, repo) = self.route().await;
        let post = repo.find_by_id(id).await?;
        tracing::debug!(%backend, post_id = %id, found = post.is_some(), "Fetched post");
        Ok(post.map(PostView::from))
    }

    /// Persist a validated post.
    pub async fn create(&self, input: NewPost) -> Result<PostView, DomainError> {
        let (backend, repo) = self.route().await;
        let post = repo.create(input).await?;
        tracing::info!(%backend, post_id = %post.id, "Created post");
        Ok(post.into())
    }

    /// Merge `patch` into a post; `None` when the id is unknown.
    pub async fn update(
        &self,
        id: &str,
        patch: PostPatch,
    ) -> Result<Option<PostView>, DomainError> {
        let (backend, repo) = self.route().await;
        let post = repo.update(id, patch).await?;
        match &post {
            Some(_) => tracing::info!(%backend, post_id = %id, "Updated post"),
            None => tracing::debug!(%backend, post_id = %id, "Update target not found"),
        }
        Ok(post.map(PostView::from))
    }

    /// Remove a post. Deleting an unknown id succeeds and returns `false`.
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let (backend, repo) = self.route().await;
        let removed = repo.delete(id).await?;
        tracing::info!(%backend, post_id = %id, removed, "Deleted post");
        Ok(removed)
    }

    pub async fn list_by_category(&self, category: Category) -> Result<Vec<PostView>, DomainError> {
        let (_, repo) = self.route().await;
        let posts = repo.find_by_category(category).await?;
        Ok(posts.into_iter().map(PostView::from).collect())
    }

    pub async fn search(&self, query: &str) -> Result<Vec<PostView>, DomainError> {
        let (_, repo) = self.route().await;
        let posts = repo.search(query).await?;
        Ok(posts.into_iter().map(PostView::from).collect())
    }
}
