use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::user;

/// Public profile of a user. Email stays private to the account owner.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    /// User ID.
    #[schema(example = 42)]
    pub id: i32,
    /// Display name.
    #[schema(example = "Alice Wonder")]
    pub name: String,
    /// Avatar image URL.
    #[schema(example = "https://images.unsplash.com/photo-abc?w=400")]
    pub avatar_url: String,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
        }
    }
}
