//! Data Transfer Objects - request/response types for the API.
//!
//! Listing and detail responses keep the context keys of the original
//! server-rendered pages: `page_obj`, `post`, `form`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Submitted post form fields.
///
/// There is deliberately no `author` field: the author always comes from
/// the authenticated session, and any submitted value is dropped during
/// deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFormData {
    pub text: String,
    #[serde(default)]
    pub group: Option<Uuid>,
}

/// One post as exposed to listing and detail contexts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostItem {
    pub id: Uuid,
    pub text: String,
    pub author_username: String,
    pub group_title: Option<String>,
    pub pub_date: DateTime<Utc>,
}

/// A page of items, mirroring the `page_obj` template context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageObj<T> {
    pub object_list: Vec<T>,
    pub number: u64,
    pub total_pages: u64,
    pub count: u64,
}

/// Listing response: `{"page_obj": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListContext {
    pub page_obj: PageObj<PostItem>,
}

/// Detail response: `{"post": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailContext {
    pub post: PostItem,
}

/// A selectable group in the post form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupChoice {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

/// A field-level validation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// The bound or unbound post form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostForm {
    pub text: String,
    pub group: Option<Uuid>,
    pub choices: Vec<GroupChoice>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

/// Form response: `{"form": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFormContext {
    pub form: PostForm,
}
