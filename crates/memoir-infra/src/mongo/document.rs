//! BSON shape of a post in the `posts` collection.

use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use memoir_core::domain::{Category, Post};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
    pub category: Category,
    #[serde(default)]
    pub read_time: Option<String>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

pub(crate) fn to_chrono(value: BsonDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

pub(crate) fn to_bson(value: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(value.timestamp_millis())
}

/// Conversion from stored document to domain Post.
impl From<PostDocument> for Post {
    fn from(doc: PostDocument) -> Self {
        Self {
            id: doc.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            title: doc.title,
            content: doc.content,
            category: doc.category,
            excerpt: doc.excerpt,
            read_time: doc.read_time,
            created_at: to_chrono(doc.created_at),
            updated_at: to_chrono(doc.updated_at),
        }
    }
}

/// Conversion from domain Post to a document. An id that is not a valid
/// ObjectId is dropped so the server assigns one.
impl From<Post> for PostDocument {
    fn from(post: Post) -> Self {
        Self {
            id: ObjectId::parse_str(&post.id).ok(),
            title: post.title,
            excerpt: post.excerpt,
            content: post.content,
            category: post.category,
            read_time: post.read_time,
            created_at: to_bson(post.created_at),
            updated_at: to_bson(post.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mongodb::bson;

    use super::*;

    #[test]
    fn test_document_field_names() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let post = Post {
            id: String::new(),
            title: "T".into(),
            content: "C".into(),
            category: Category::Devops,
            excerpt: None,
            read_time: Some("1 min read".into()),
            created_at: at,
            updated_at: at,
        };

        let doc = bson::to_document(&PostDocument::from(post)).unwrap();

        assert!(!doc.contains_key("_id"));
        assert_eq!(doc.get_str("category").unwrap(), "devops");
        assert_eq!(doc.get_str("readTime").unwrap(), "1 min read");
        assert!(doc.get_datetime("createdAt").is_ok());
    }

    #[test]
    fn test_round_trip_keeps_object_id_hex() {
        let oid = ObjectId::new();
        let at = BsonDateTime::from_millis(1_700_000_000_123);
        let doc = PostDocument {
            id: Some(oid),
            title: "T".into(),
            excerpt: Some("E".into()),
            content: "C".into(),
            category: Category::Mobile,
            read_time: None,
            created_at: at,
            updated_at: at,
        };

        let post = Post::from(doc);

        assert_eq!(post.id, oid.to_hex());
        assert_eq!(post.created_at.timestamp_millis(), 1_700_000_000_123);
    }
}
