//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request to login with the configured admin credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// A user's public information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
}

/// Response of `GET /api/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: Option<UserResponse>,
    pub is_admin: bool,
}

/// Role marker of an admin session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRole {
    pub role: String,
}

/// Response of `GET /api/admin/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminMeResponse {
    pub admin: Option<AdminRole>,
}

/// Body of `POST /api/posts` and `PUT /api/posts/{id}`.
///
/// `tags` is either an array of strings or one comma-separated string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    /// HTML body.
    pub body: Option<String>,
    /// Older editor field name for `body`; ignored when `body` is present.
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub tags: Option<serde_json::Value>,
}

impl PostRequest {
    /// The HTML body under whichever name the client sent, `body` first.
    pub fn html(&mut self) -> Option<String> {
        self.body.take().or_else(|| self.content.take())
    }
}

/// A full post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub author: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post as shown in the blog index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Query string of `GET /api/posts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostListQuery {
    pub q: Option<String>,
}

/// Body of `POST /api/newsletter`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsletterRequest {
    #[serde(default)]
    pub email: String,
}

/// Body of `POST /api/contact`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub store_address: String,
    /// Browser-supplied coordinates; when both are valid the address is not geocoded.
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Response of `POST /api/contact`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub ok: bool,
    pub latitude: f64,
    pub longitude: f64,
}

/// Response of `POST /api/uploads`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Body carrying a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_request_accepts_body_and_content_together() {
        let mut req: PostRequest =
            serde_json::from_str(r#"{"body":"<p>new</p>","content":"<p>old</p>"}"#).unwrap();
        assert_eq!(req.html().as_deref(), Some("<p>new</p>"));

        let mut req: PostRequest = serde_json::from_str(r#"{"content":"<p>old</p>"}"#).unwrap();
        assert_eq!(req.html().as_deref(), Some("<p>old</p>"));

        assert_eq!(PostRequest::default().html(), None);
    }

    #[test]
    fn test_contact_request_coordinates_are_optional() {
        let req: ContactRequest = serde_json::from_str(
            r#"{"name":"Sam","email":"s@x.com","message":"hi","storeAddress":"1 Main St"}"#,
        )
        .unwrap();
        assert_eq!(req.latitude, None);

        let req: ContactRequest =
            serde_json::from_str(r#"{"latitude":40.5,"longitude":-74.25}"#).unwrap();
        assert_eq!(req.latitude, Some(40.5));
        assert_eq!(req.longitude, Some(-74.25));
    }
}
