use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pin")]
pub struct Model {
    /// UUIDv7, assigned at insert. Time-ordered, so the id is a stable
    /// tiebreaker for created_at ordering.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,
    pub description: String,
    /// Lowercase tag strings stored as a JSON array.
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: serde_json::Value,
    pub image_url: String,

    pub created_by: i32,
    #[sea_orm(belongs_to, from = "created_by", to = "id")]
    pub creator: HasOne<super::user::Entity>,
    /// Creator display name, denormalized at upload time.
    pub username: String,

    // Denormalized counters, kept in step with the link tables.
    pub likes: i32,
    pub saves: i32,

    #[sea_orm(has_many)]
    pub like_links: HasMany<super::pin_like::Entity>,
    #[sea_orm(has_many)]
    pub save_links: HasMany<super::pin_save::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
