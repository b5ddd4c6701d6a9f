use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::Category;
use crate::error::DomainError;

/// Post entity - a single blog entry as owned by a storage backend.
///
/// `excerpt` and `read_time` stay optional here because records written by
/// older versions may lack them; defaults are applied when the post is
/// projected into a [`PostView`](super::PostView).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub excerpt: Option<String>,
    pub read_time: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with backend-assigned `id` and both timestamps set to `now`.
    pub fn create(id: String, input: NewPost, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            content: input.content,
            category: input.category,
            excerpt: input.excerpt,
            read_time: input.read_time,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow-merge `patch` over this post and refresh `updated_at`.
    ///
    /// `created_at` is never touched. `updated_at` always moves forward, even
    /// when the clock has not advanced past the previous value at millisecond
    /// precision (the coarsest precision any backend stores).
    pub fn apply(&mut self, patch: PostPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(excerpt) = patch.excerpt {
            self.excerpt = Some(excerpt);
        }
        if let Some(read_time) = patch.read_time {
            self.read_time = Some(read_time);
        }

        let floor = self.updated_at + TimeDelta::milliseconds(1);
        self.updated_at = now.max(floor);
    }
}

/// Validated input for creating a post.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub excerpt: Option<String>,
    pub read_time: Option<String>,
}

impl NewPost {
    /// Validate the required fields. The title is trimmed; title and content
    /// must not be blank.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: Category,
    ) -> Result<Self, DomainError> {
        let title = title.into().trim().to_string();
        let content = content.into();

        if title.is_empty() {
            return Err(DomainError::Validation("title must not be empty".into()));
        }
        if content.trim().is_empty() {
            return Err(DomainError::Validation("content must not be empty".into()));
        }

        Ok(Self {
            title,
            content,
            category,
            excerpt: None,
            read_time: None,
        })
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into().trim().to_string());
        self
    }

    pub fn with_read_time(mut self, read_time: impl Into<String>) -> Self {
        self.read_time = Some(read_time.into());
        self
    }
}

/// Partial update for a post. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Category>,
    pub excerpt: Option<String>,
    pub read_time: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.excerpt.is_none()
            && self.read_time.is_none()
    }
}
