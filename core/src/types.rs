//! Request payloads for the photo platform API.
//!
//! # Design
//! The client forwards payloads without validating them, so every endpoint
//! accepts any `Serialize` body. These structs mirror the server's schemas
//! for callers that want typed construction. Responses stay opaque
//! `serde_json::Value`s.

use serde::{Deserialize, Serialize};

/// Registration form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub id_number: String,
    pub confirm_password: String,
}

/// Login credentials. Users sign in with their id number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub id_number: String,
    pub password: String,
}

/// Step one of a password reset: is this id number registered?
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPassword {
    pub id_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPassword {
    pub id_number: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// Partial post update; omitted fields stay unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: i64,
    pub content: String,
}

/// Body shared by likes, collecting and adding to a collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PostRef {
    pub post_id: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FollowRequest {
    pub following_id: i64,
}

/// Score in `0.0..=10.0` with at most one decimal; the server enforces it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RatingRequest {
    pub post_id: i64,
    pub score: f32,
}

/// Create or rename a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionName {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub recipient_id: i64,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Offset pagination accepted by every list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Page {
    pub fn new(skip: u32, limit: u32) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_update_omits_unset_fields() {
        let update = PostUpdate {
            title: Some("Golden hour".to_string()),
            ..PostUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"title": "Golden hour"}));
    }

    #[test]
    fn empty_page_serializes_to_empty_object() {
        let json = serde_json::to_value(Page::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn new_post_images_default_to_none() {
        let post: NewPost = serde_json::from_str(r#"{"title":"t","content":"c"}"#).unwrap();
        assert!(post.images.is_none());
    }
}
