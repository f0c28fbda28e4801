use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::feed::service::PinWithStatus;

/// Most tags the ingestion pass keeps per pin.
pub const MAX_TAGS: usize = 12;

/// Query parameters for the pin feed.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct FeedQuery {
    /// Page size (1-100, default 20).
    #[param(example = 20)]
    pub limit: Option<u64>,
    /// Number of pins to skip.
    #[param(example = 0)]
    pub offset: Option<u64>,
    /// Search term matched against title, description and tags.
    #[param(example = "sunset")]
    pub search: Option<String>,
}

/// Query parameters for per-user pin listings.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserPinsQuery {
    /// Page size (1-100, default 20).
    #[param(example = 20)]
    pub limit: Option<u64>,
    /// Number of pins to skip.
    #[param(example = 0)]
    pub offset: Option<u64>,
}

/// A pin as served to clients.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PinResponse {
    /// Pin ID.
    pub id: Uuid,
    /// Generated title.
    #[schema(example = "Sunset over the pier")]
    pub title: String,
    /// Generated description.
    pub description: String,
    /// Generated tags, lowercased.
    #[schema(example = json!(["sunset", "ocean"]))]
    pub tags: Vec<String>,
    /// URL the stored image is served from.
    #[schema(example = "/api/v1/media/3f2a...")]
    pub image_url: String,
    /// ID of the uploading user.
    #[schema(example = 42)]
    pub created_by: i32,
    /// Display name of the uploading user at upload time.
    #[schema(example = "Alice Wonder")]
    pub username: String,
    /// Total likes across all users.
    #[schema(example = 7)]
    pub likes: i32,
    /// Total saves across all users.
    #[schema(example = 3)]
    pub saves: i32,
    /// Upload time.
    pub created_at: DateTime<Utc>,
    /// Whether the requesting user has liked this pin. Absent for
    /// anonymous requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
    /// Whether the requesting user has saved this pin. Absent for
    /// anonymous requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<bool>,
}

impl From<PinWithStatus> for PinResponse {
    fn from(entry: PinWithStatus) -> Self {
        let pin = entry.pin;
        Self {
            id: pin.id,
            title: pin.title,
            description: pin.description,
            tags: tags_from_json(&pin.tags),
            image_url: pin.image_url,
            created_by: pin.created_by,
            username: pin.username,
            likes: pin.likes,
            saves: pin.saves,
            created_at: pin.created_at,
            liked: entry.liked,
            saved: entry.saved,
        }
    }
}

/// Decode the stored JSON tag array, skipping anything that is not a
/// string.
pub fn tags_from_json(tags: &serde_json::Value) -> Vec<String> {
    tags.as_array()
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Clean up captioner tags: trim, lowercase, drop empties and
/// duplicates, cap the count.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .take(MAX_TAGS)
        .collect()
}
