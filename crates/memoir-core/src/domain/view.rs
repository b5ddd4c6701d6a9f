use serde::{Deserialize, Serialize};

use super::{Category, Post};

/// Read-time label used when a post does not carry one.
pub const DEFAULT_READ_TIME: &str = "5 min read";

/// The external shape of a post, identical whichever backend served it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: Category,
    /// Creation date as `YYYY-MM-DD` (UTC).
    pub date: String,
    #[serde(rename = "readTime")]
    pub read_time: String,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self {
            date: post.created_at.date_naive().format("%Y-%m-%d").to_string(),
            id: post.id,
            title: post.title,
            excerpt: post.excerpt.unwrap_or_default(),
            content: post.content,
            category: post.category,
            read_time: post
                .read_time
                .unwrap_or_else(|| DEFAULT_READ_TIME.to_string()),
        }
    }
}
