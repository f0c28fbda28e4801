use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Metadata for an uploaded media blob. The bytes live in the media store
/// under the same content hash.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media_object")]
pub struct Model {
    /// 64-character lowercase SHA-256 hex.
    #[sea_orm(primary_key, auto_increment = false)]
    pub content_hash: String,

    /// MIME type recorded at upload, served back verbatim.
    pub content_type: String,

    /// Size in bytes.
    pub size: i64,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
