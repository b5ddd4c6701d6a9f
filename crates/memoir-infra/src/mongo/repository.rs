//! MongoDB post repository and connectivity probe.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Document, doc};
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection, Database};

use memoir_core::domain::{Category, NewPost, Post, PostPatch};
use memoir_core::error::RepoError;
use memoir_core::ports::{Connectivity, PostRepository};

use super::document::{PostDocument, to_bson, to_chrono};

const DEFAULT_URI: &str = "mongodb://localhost:27017/el-memoir";
const DEFAULT_DATABASE: &str = "el-memoir";

/// MongoDB connection configuration.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Connection string (e.g., mongodb://localhost:27017/el-memoir)
    pub uri: String,
    /// Database name; falls back to the one in the URI, then `el-memoir`
    pub database: Option<String>,
    /// Collection holding the posts
    pub collection: String,
    /// Bound on the startup handshake
    pub server_selection_timeout: Duration,
    /// Bound on each per-call readiness ping
    pub ready_timeout: Duration,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            database: None,
            collection: "posts".to_string(),
            server_selection_timeout: Duration::from_secs(5),
            ready_timeout: Duration::from_millis(1000),
        }
    }
}

impl MongoConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            uri: std::env::var("MONGODB_URI").unwrap_or_else(|_| DEFAULT_URI.to_string()),
            database: std::env::var("MONGODB_DATABASE").ok(),
            collection: std::env::var("MONGODB_COLLECTION")
                .unwrap_or_else(|_| "posts".to_string()),
            server_selection_timeout: Duration::from_secs(
                std::env::var("MONGODB_SERVER_SELECTION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            ready_timeout: Duration::from_millis(
                std::env::var("MONGODB_READY_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000),
            ),
        }
    }

    /// True when the URI points at a local server.
    pub fn is_local(&self) -> bool {
        self.uri.contains("localhost") || self.uri.contains("127.0.0.1")
    }
}

/// Post repository backed by a MongoDB collection.
///
/// Building the repository performs no network I/O; the handshake happens in
/// [`Connectivity::connect`].
pub struct MongoPostRepository {
    database: Database,
    posts: Collection<PostDocument>,
    config: MongoConfig,
}

impl MongoPostRepository {
    pub async fn new(config: MongoConfig) -> Result<Self, RepoError> {
        // SRV URIs resolve DNS while parsing.
        let parse = ClientOptions::parse(config.uri.as_str());
        let mut options = tokio::time::timeout(config.server_selection_timeout, parse)
            .await
            .map_err(|_| RepoError::Timeout(config.server_selection_timeout))?
            .map_err(|e| RepoError::Connection(e.to_string()))?;

        options.server_selection_timeout = Some(config.server_selection_timeout);
        options.connect_timeout = Some(config.server_selection_timeout);
        options.app_name = Some("el-memoir".to_string());

        let database_name = config
            .database
            .clone()
            .or_else(|| options.default_database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client =
            Client::with_options(options).map_err(|e| RepoError::Connection(e.to_string()))?;
        let database = client.database(&database_name);
        let posts = database.collection::<PostDocument>(&config.collection);

        Ok(Self {
            database,
            posts,
            config,
        })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, RepoError> {
        Self::new(MongoConfig::from_env()).await
    }

    async fn ping(&self, limit: Duration) -> Result<(), RepoError> {
        let ping = self.database.run_command(doc! { "ping": 1 });
        tokio::time::timeout(limit, ping)
            .await
            .map_err(|_| RepoError::Timeout(limit))?
            .map_err(|e| RepoError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn find_sorted(&self, filter: Document) -> Result<Vec<Post>, RepoError> {
        let cursor = self
            .posts
            .find(filter)
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await
            .map_err(query_error)?;
        let docs: Vec<PostDocument> = cursor.try_collect().await.map_err(query_error)?;
        Ok(docs.into_iter().map(Into::into).collect())
    }
}

fn query_error(e: mongodb::error::Error) -> RepoError {
    RepoError::Query(e.to_string())
}

/// Pipeline `$set` stage for a patch. Values go through `$literal` so user
/// text starting with `$` is never read as a field path. `updatedAt` always
/// moves at least one millisecond past its stored value.
fn patch_stage(patch: PostPatch, now: chrono::DateTime<chrono::Utc>) -> Document {
    let mut set = Document::new();
    if let Some(title) = patch.title {
        set.insert("title", doc! { "$literal": title });
    }
    if let Some(content) = patch.content {
        set.insert("content", doc! { "$literal": content });
    }
    if let Some(category) = patch.category {
        set.insert("category", doc! { "$literal": category.as_str() });
    }
    if let Some(excerpt) = patch.excerpt {
        set.insert("excerpt", doc! { "$literal": excerpt });
    }
    if let Some(read_time) = patch.read_time {
        set.insert("readTime", doc! { "$literal": read_time });
    }
    set.insert(
        "updatedAt",
        doc! { "$max": [to_bson(now), { "$add": ["$updatedAt", 1] }] },
    );
    doc! { "$set": set }
}

#[async_trait]
impl Connectivity for MongoPostRepository {
    async fn connect(&self) -> Result<(), RepoError> {
        self.ping(self.config.server_selection_timeout).await?;
        tracing::info!(
            database = %self.database.name(),
            local = self.config.is_local(),
            "MongoDB handshake succeeded"
        );
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        match self.ping(self.config.ready_timeout).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "MongoDB readiness check failed");
                false
            }
        }
    }
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        self.find_sorted(doc! {}).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, RepoError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let found = self
            .posts
            .find_one(doc! { "_id": oid })
            .await
            .map_err(query_error)?;
        Ok(found.map(Into::into))
    }

    async fn create(&self, input: NewPost) -> Result<Post, RepoError> {
        // Truncate to the millisecond precision BSON dates keep.
        let now = to_chrono(to_bson(chrono::Utc::now()));
        let mut post = Post::create(String::new(), input, now);

        let result = self
            .posts
            .insert_one(PostDocument::from(post.clone()))
            .await
            .map_err(query_error)?;
        let oid = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepoError::Query("Inserted id is not an ObjectId".to_string()))?;

        post.id = oid.to_hex();
        Ok(post)
    }

    async fn update(&self, id: &str, patch: PostPatch) -> Result<Option<Post>, RepoError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let updated = self
            .posts
            .find_one_and_update(
                doc! { "_id": oid },
                vec![patch_stage(patch, chrono::Utc::now())],
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(query_error)?;
        Ok(updated.map(Into::into))
    }

    async fn delete(&self, id: &str) -> Result<bool, RepoError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let result = self
            .posts
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(query_error)?;
        Ok(result.deleted_count > 0)
    }

    async fn find_by_category(&self, category: Category) -> Result<Vec<Post>, RepoError> {
        self.find_sorted(doc! { "category": category.as_str() })
            .await
    }
}
