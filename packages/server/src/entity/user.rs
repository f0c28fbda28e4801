use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    /// Stored lowercased; uniqueness is case-insensitive by construction.
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub avatar_url: String,

    #[sea_orm(has_many)]
    pub pins: HasMany<super::pin::Entity>,
    #[sea_orm(has_many)]
    pub likes: HasMany<super::pin_like::Entity>,
    #[sea_orm(has_many)]
    pub saves: HasMany<super::pin_save::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
