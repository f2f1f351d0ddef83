//! Remote resource models and client
//!
//! This module contains the data types exchanged with the posts REST API and
//! the client used to talk to it.

pub mod client;

pub use client::{PostsClient, DEFAULT_BASE_URL};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the remote resource
///
/// HTTP status codes are not inspected (except by `delete_post`), so an error
/// page comes back as `Parse` when its body is not the expected JSON.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The background task running a request panicked or was cancelled
    #[error("Background fetch did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A post author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier assigned by the remote resource
    pub id: u64,
    /// Display name
    pub name: String,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A post as returned by the remote resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    /// Author of the post
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub title: String,
    pub body: String,
}

/// The writable fields of a post, sent on create and update
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

impl From<&Post> for PostDraft {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            body: post.body.clone(),
            user_id: post.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_deserializes_camel_case_user_id() {
        let json = r#"{
            "userId": 1,
            "id": 1,
            "title": "sunt aut facere repellat provident occaecati excepturi optio reprehenderit",
            "body": "quia et suscipit\nsuscipit recusandae consequuntur expedita"
        }"#;

        let post: Post = serde_json::from_str(json).expect("Failed to deserialize Post");

        assert_eq!(post.id, 1);
        assert_eq!(post.user_id, 1);
        assert!(post.title.starts_with("sunt aut facere"));
    }

    #[test]
    fn test_user_ignores_extra_fields() {
        let json = r#"{
            "id": 2,
            "name": "Ervin Howell",
            "username": "Antonette",
            "email": "Shanna@melissa.tv",
            "address": { "city": "Wisokyburgh" }
        }"#;

        let user: User = serde_json::from_str(json).expect("Failed to deserialize User");

        assert_eq!(user, User::new(2, "Ervin Howell"));
    }

    #[test]
    fn test_draft_serializes_user_id_as_camel_case() {
        let draft = PostDraft {
            title: "t".to_string(),
            body: "b".to_string(),
            user_id: 7,
        };

        let value = serde_json::to_value(&draft).unwrap();

        assert_eq!(value["userId"], 7);
        assert!(value.get("user_id").is_none());
    }

    #[test]
    fn test_draft_from_post_copies_writable_fields() {
        let post = Post {
            id: 9,
            user_id: 3,
            title: "qui est esse".to_string(),
            body: "est rerum tempore vitae".to_string(),
        };

        let draft = PostDraft::from(&post);

        assert_eq!(draft.title, "qui est esse");
        assert_eq!(draft.body, "est rerum tempore vitae");
        assert_eq!(draft.user_id, 3);
    }

    #[test]
    fn test_api_error_display() {
        let parse_err = serde_json::from_str::<User>("not json").unwrap_err();
        let err = ApiError::from(parse_err);
        assert!(err.to_string().starts_with("Failed to parse JSON response"));
    }
}
