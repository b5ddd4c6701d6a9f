//! On-disk shape of a post in the JSON file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use memoir_core::domain::{Category, Post};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub content: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conversion from file record to domain Post.
impl From<PostRecord> for Post {
    fn from(record: PostRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            content: record.content,
            category: record.category,
            excerpt: record.excerpt,
            read_time: record.read_time,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Conversion from domain Post to file record.
impl From<Post> for PostRecord {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            excerpt: post.excerpt,
            content: post.content,
            category: post.category,
            read_time: post.read_time,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
