use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One user saving one pin to their profile. Same shape as `pin_like`;
/// the two stay separate tables because likes and saves are independent
/// states with independent counters.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pin_save")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(primary_key)]
    pub pin_id: Uuid,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,
    #[sea_orm(belongs_to, from = "pin_id", to = "id")]
    pub pin: HasOne<super::pin::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
