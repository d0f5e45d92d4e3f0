use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a single authored text entry, optionally tagged with a group.
///
/// `author_id` and `pub_date` are fixed at creation; edits only touch
/// `text` and `group_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<Uuid>,
    pub pub_date: DateTime<Utc>,
}

impl Post {
    /// Create a new post authored by the given user.
    pub fn new(author_id: Uuid, text: String, group_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            text,
            group_id,
            pub_date: Utc::now(),
        }
    }

    /// Apply an edit: replaces text and group, keeps author and pub_date.
    pub fn edited(mut self, text: String, group_id: Option<Uuid>) -> Self {
        self.text = text;
        self.group_id = group_id;
        self
    }
}
