//! Data Transfer Objects - request bodies for the posts API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/posts`.
///
/// Every field is optional on the wire so a missing required field yields
/// the API's own error message rather than a deserializer error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub excerpt: Option<String>,
    pub read_time: Option<String>,
}

/// Body of `PUT /api/posts/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub excerpt: Option<String>,
    pub read_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_accepts_camel_case_and_missing_fields() {
        let req: CreatePostRequest =
            serde_json::from_str(r#"{"title":"A","readTime":"2 min read"}"#).unwrap();

        assert_eq!(req.title.as_deref(), Some("A"));
        assert_eq!(req.read_time.as_deref(), Some("2 min read"));
        assert!(req.content.is_none());
    }
}
