//! JSON file post repository.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tokio::sync::{Mutex, OwnedMutexGuard};

use memoir_core::domain::{NewPost, Post, PostPatch};
use memoir_core::error::RepoError;
use memoir_core::ports::PostRepository;

use super::record::PostRecord;

/// Post repository persisted as a single pretty-printed JSON array.
///
/// Every mutation is a read-modify-write of the whole file. The cycle runs
/// under an async mutex so concurrent writers in this process cannot lose
/// each other's updates, and the file is replaced atomically (temp file in
/// the same directory, then rename).
///
/// Single-process only: two processes sharing the file will clobber each other.
pub struct JsonFilePostRepository {
    path: PathBuf,
    io_timeout: Duration,
    /// Serializes read-modify-write cycles and holds the last id handed out,
    /// so an id freed by a delete is never issued again.
    lock: Arc<Mutex<i64>>,
}

impl JsonFilePostRepository {
    pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

    /// Open the store at `path`, creating the file (and its parent
    /// directories) with an empty collection if it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, RepoError> {
        Self::open_with_timeout(path, Self::DEFAULT_IO_TIMEOUT).await
    }

    pub async fn open_with_timeout(
        path: impl Into<PathBuf>,
        io_timeout: Duration,
    ) -> Result<Self, RepoError> {
        let repo = Self {
            path: path.into(),
            io_timeout,
            lock: Arc::new(Mutex::new(0)),
        };
        repo.ensure_file_exists().await?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_file_exists(&self) -> Result<(), RepoError> {
        let guard = self.lock.clone().lock_owned().await;

        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        if let Some(parent) = parent_dir(&self.path) {
            tokio::fs::create_dir_all(parent).await?;
        }

        self.persist(&[], guard).await?;
        tracing::info!(path = %self.path.display(), "Created empty posts file");
        Ok(())
    }

    /// Read path: failures are logged and degrade to an empty collection.
    async fn read_or_empty(&self) -> Vec<Post> {
        match self.read_all().await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Error reading posts file");
                Vec::new()
            }
        }
    }

    /// Mutation path: an unreadable file is a hard failure, so a corrupt
    /// collection is never overwritten with a fresh one.
    async fn read_all(&self) -> Result<Vec<Post>, RepoError> {
        let read = tokio::fs::read_to_string(&self.path);
        let data = match tokio::time::timeout(self.io_timeout, read).await {
            Err(_) => return Err(RepoError::Timeout(self.io_timeout)),
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Ok(result) => result?,
        };

        let records: Vec<PostRecord> =
            serde_json::from_str(&data).map_err(|e| RepoError::Serialization(e.to_string()))?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Write the full collection. The lock guard travels into the blocking
    /// task so it is released only once the file has actually been replaced,
    /// even if the caller stopped waiting after `io_timeout`.
    ///
    /// A `RepoError::Timeout` therefore does not mean the write was dropped:
    /// the rename may still land afterwards, and a caller that retries a
    /// timed-out create can end up with the post stored twice.
    async fn persist(&self, posts: &[Post], guard: OwnedMutexGuard<i64>) -> Result<(), RepoError> {
        let records: Vec<PostRecord> = posts.iter().cloned().map(Into::into).collect();
        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| RepoError::Serialization(e.to_string()))?;

        let path = self.path.clone();
        let task = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            write_atomic(&path, &json)
        });

        match tokio::time::timeout(self.io_timeout, task).await {
            Err(_) => {
                tracing::warn!(path = %self.path.display(), "Posts file write still in flight after timeout");
                Err(RepoError::Timeout(self.io_timeout))
            }
            Ok(Err(join)) => Err(RepoError::Io(join.to_string())),
            Ok(Ok(result)) => result,
        }
    }
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Replace `path` with `content` via tempfile + rename.
fn write_atomic(path: &Path, content: &str) -> Result<(), RepoError> {
    let parent = parent_dir(path).unwrap_or_else(|| Path::new("."));

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.as_file().sync_all()?;
    temp_file
        .persist(path)
        .map_err(|e| RepoError::Io(e.error.to_string()))?;

    Ok(())
}

/// Ids are creation times in epoch milliseconds, kept strictly above every
/// id in the file and every id issued before (`last_issued`).
fn next_id(posts: &[Post], last_issued: i64, now: DateTime<Utc>) -> i64 {
    let highest = posts
        .iter()
        .filter_map(|p| p.id.parse::<i64>().ok())
        .fold(last_issued, i64::max);
    now.timestamp_millis().max(highest.saturating_add(1))
}

#[async_trait]
impl PostRepository for JsonFilePostRepository {
    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.read_or_empty().await)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, RepoError> {
        let posts = self.read_or_empty().await;
        Ok(posts.into_iter().find(|p| p.id == id))
    }

    async fn create(&self, input: NewPost) -> Result<Post, RepoError> {
        let mut guard = self.lock.clone().lock_owned().await;
        let mut posts = self.read_all().await?;

        let now = Utc::now();
        let id = next_id(&posts, *guard, now);
        *guard = id;
        let post = Post::create(id.to_string(), input, now);
        posts.insert(0, post.clone());

        self.persist(&posts, guard).await.inspect_err(|e| {
            tracing::error!(post_id = %post.id, error = %e, "Error saving post");
        })?;
        Ok(post)
    }

    async fn update(&self, id: &str, patch: PostPatch) -> Result<Option<Post>, RepoError> {
        let guard = self.lock.clone().lock_owned().await;
        let mut posts = self.read_all().await?;

        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        post.apply(patch, Utc::now());
        let updated = post.clone();

        self.persist(&posts, guard).await.inspect_err(|e| {
            tracing::error!(post_id = %id, error = %e, "Error updating post");
        })?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> Result<bool, RepoError> {
        let guard = self.lock.clone().lock_owned().await;
        let mut posts = self.read_all().await?;

        let before = posts.len();
        posts.retain(|p| p.id != id);
        let removed = posts.len() != before;

        self.persist(&posts, guard).await.inspect_err(|e| {
            tracing::error!(post_id = %id, error = %e, "Error deleting post");
        })?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use memoir_core::domain::Category;
    use tempfile::TempDir;

    use super::*;

    async fn open_temp() -> (TempDir, JsonFilePostRepository) {
        let dir = TempDir::new().unwrap();
        let repo = JsonFilePostRepository::open(dir.path().join("posts.json"))
            .await
            .unwrap();
        (dir, repo)
    }

    fn input(title: &str) -> NewPost {
        NewPost::new(title, "hello", Category::Frontend).unwrap()
    }

    #[tokio::test]
    async fn test_open_creates_empty_collection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("posts.json");

        let repo = JsonFilePostRepository::open(&path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.trim(), "[]");
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_keeps_existing_file() {
        let (dir, repo) = open_temp().await;
        repo.create(input("kept")).await.unwrap();

        let reopened = JsonFilePostRepository::open(dir.path().join("posts.json"))
            .await
            .unwrap();

        assert_eq!(reopened.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (_dir, repo) = open_temp().await;

        let created = repo
            .create(input("A").with_excerpt("short").with_read_time("3 min read"))
            .await
            .unwrap();
        let fetched = repo.find_by_id(&created.id).await.unwrap().unwrap();

        assert!(!fetched.id.is_empty());
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "A");
        assert_eq!(fetched.content, "hello");
        assert_eq!(fetched.excerpt.as_deref(), Some("short"));
        assert_eq!(fetched.read_time.as_deref(), Some("3 min read"));
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_persisted_format() {
        let (_dir, repo) = open_temp().await;
        let created = repo.create(input("A")).await.unwrap();

        let raw = std::fs::read_to_string(repo.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert!(raw.contains("\n  {"), "file should be pretty-printed");
        assert_eq!(json[0]["_id"], created.id.as_str());
        assert_eq!(json[0]["category"], "frontend");
        assert!(json[0]["createdAt"].as_str().unwrap().contains('T'));
        assert!(json[0]["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn test_list_is_newest_first_with_unique_ids() {
        let (_dir, repo) = open_temp().await;

        for i in 0..5 {
            repo.create(input(&format!("post {i}"))).await.unwrap();
        }
        let posts = repo.list().await.unwrap();

        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["post 4", "post 3", "post 2", "post 1", "post 0"]);

        let mut ids: Vec<_> = posts.iter().map(|p| p.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn test_update_merges_and_refreshes_updated_at() {
        let (_dir, repo) = open_temp().await;
        let created = repo.create(input("A")).await.unwrap();

        let patch = PostPatch {
            content: Some("rewritten".into()),
            category: Some(Category::Personal),
            ..Default::default()
        };
        let updated = repo.update(&created.id, patch).await.unwrap().unwrap();
        let fetched = repo.find_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(fetched, updated);
        assert_eq!(fetched.title, "A");
        assert_eq!(fetched.content, "rewritten");
        assert_eq!(fetched.category, Category::Personal);
        assert_eq!(fetched.created_at, created.created_at);
        assert!(fetched.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_absent() {
        let (_dir, repo) = open_temp().await;
        repo.create(input("A")).await.unwrap();

        let patch = PostPatch {
            title: Some("B".into()),
            ..Default::default()
        };
        let result = repo.update("does-not-exist", patch).await.unwrap();

        assert!(result.is_none());
        let posts = repo.list().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "A");
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, repo) = open_temp().await;
        let a = repo.create(input("A")).await.unwrap();
        let b = repo.create(input("B")).await.unwrap();

        assert!(repo.delete(&a.id).await.unwrap());
        assert!(repo.find_by_id(&a.id).await.unwrap().is_none());

        assert!(!repo.delete("does-not-exist").await.unwrap());
        let remaining = repo.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, b.id);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_empty_but_refuses_writes() {
        let (_dir, repo) = open_temp().await;
        std::fs::write(repo.path(), "{ not json").unwrap();

        assert!(repo.list().await.unwrap().is_empty());
        assert!(repo.find_by_id("1").await.unwrap().is_none());

        let result = repo.create(input("A")).await;
        assert!(matches!(result, Err(RepoError::Serialization(_))));
        assert_eq!(std::fs::read_to_string(repo.path()).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn test_write_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("gone");
        let repo = JsonFilePostRepository::open(sub.join("posts.json"))
            .await
            .unwrap();
        std::fs::remove_dir_all(&sub).unwrap();

        let result = repo.create(input("A")).await;

        assert!(matches!(result, Err(RepoError::Io(_))));
    }

    #[tokio::test]
    async fn test_accepts_records_without_optional_fields() {
        let (_dir, repo) = open_temp().await;
        std::fs::write(
            repo.path(),
            r#"[
  {
    "_id": "1700000000000",
    "title": "Legacy",
    "content": "old",
    "category": "backend",
    "createdAt": "2023-11-14T22:13:20.000Z",
    "updatedAt": "2023-11-14T22:13:20.000Z"
  }
]"#,
        )
        .unwrap();

        let post = repo.find_by_id("1700000000000").await.unwrap().unwrap();

        assert_eq!(post.category, Category::Backend);
        assert!(post.excerpt.is_none());
        assert!(post.read_time.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_not_lost() {
        let (_dir, repo) = open_temp().await;
        let repo = Arc::new(repo);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create(input(&format!("post {i}"))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repo.list().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_ids_are_never_reused_after_delete() {
        let (_dir, repo) = open_temp().await;

        for _ in 0..50 {
            let a = repo.create(input("A")).await.unwrap();
            assert!(repo.delete(&a.id).await.unwrap());
            let b = repo.create(input("B")).await.unwrap();

            let (a_id, b_id): (i64, i64) = (a.id.parse().unwrap(), b.id.parse().unwrap());
            assert!(b_id > a_id, "{b_id} should be above {a_id}");
            assert!(repo.delete(&b.id).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_ids_stay_above_existing_records() {
        let (_dir, repo) = open_temp().await;
        let future_id = Utc::now().timestamp_millis() + 60_000;
        std::fs::write(
            repo.path(),
            format!(
                r#"[{{"_id":"{future_id}","title":"T","content":"c","category":"backend","createdAt":"2023-11-14T22:13:20.000Z","updatedAt":"2023-11-14T22:13:20.000Z"}}]"#
            ),
        )
        .unwrap();

        let created = repo.create(input("A")).await.unwrap();

        assert_eq!(created.id, (future_id + 1).to_string());
    }

    /// Opening the write end releases a reader parked on the FIFO.
    #[cfg(unix)]
    fn release_fifo(path: &Path) {
        drop(std::fs::OpenOptions::new().write(true).open(path).unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stalled_file_reads_degrade_and_writes_time_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.json");
        // Reads of a FIFO with no writer block until one shows up.
        let status = std::process::Command::new("mkfifo")
            .arg(&path)
            .status()
            .unwrap();
        assert!(status.success());

        let limit = Duration::from_millis(100);
        let repo = JsonFilePostRepository::open_with_timeout(&path, limit)
            .await
            .unwrap();

        let listed = repo.list().await;
        release_fifo(&path);
        let found = repo.find_by_id("1").await;
        release_fifo(&path);
        let created = repo.create(input("A")).await;
        release_fifo(&path);

        assert!(listed.unwrap().is_empty());
        assert!(found.unwrap().is_none());
        assert!(matches!(created, Err(RepoError::Timeout(d)) if d == limit));
    }
}
