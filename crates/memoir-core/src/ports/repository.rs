use async_trait::async_trait;

use crate::domain::{Category, NewPost, Post, PostPatch};
use crate::error::RepoError;

/// Post repository - the contract both storage backends implement.
///
/// Every listing is ordered newest first. An unknown id is never an error:
/// lookups and updates return `None`, deletes return `false`.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts, most recently created first.
    async fn list(&self) -> Result<Vec<Post>, RepoError>;

    /// Find a post by its backend-assigned id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, RepoError>;

    /// Persist a new post, assigning its id and timestamps.
    async fn create(&self, input: NewPost) -> Result<Post, RepoError>;

    /// Merge `patch` into an existing post and refresh `updated_at`.
    async fn update(&self, id: &str, patch: PostPatch) -> Result<Option<Post>, RepoError>;

    /// Remove a post. Returns whether a record was actually removed.
    async fn delete(&self, id: &str) -> Result<bool, RepoError>;

    /// Posts in `category`, newest first. Full scan over [`list`](Self::list).
    async fn find_by_category(&self, category: Category) -> Result<Vec<Post>, RepoError> {
        let posts = self.list().await?;
        Ok(posts
            .into_iter()
            .filter(|p| p.category == category)
            .collect())
    }

    /// Case-insensitive substring search over title, excerpt and content.
    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError> {
        let needle = query.to_lowercase();
        let posts = self.list().await?;
        Ok(posts
            .into_iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.content.to_lowercase().contains(&needle)
                    || p
                        .excerpt
                        .as_deref()
                        .is_some_and(|e| e.to_lowercase().contains(&needle))
            })
            .collect())
    }
}
