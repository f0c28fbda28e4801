use std::collections::HashSet;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entity::{pin_like, pin_save};

/// Upper bound on how many liked/saved pin ids are loaded per user for
/// status enrichment. Heavy users under-report entries beyond the cap;
/// a feed page stays O(page), not O(user history).
pub const STATUS_INDEX_CAP: u64 = 200;

/// Ids of all pins the user has liked, up to [`STATUS_INDEX_CAP`].
pub async fn liked_pin_ids<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<HashSet<Uuid>, DbErr> {
    let ids: Vec<Uuid> = pin_like::Entity::find()
        .filter(pin_like::Column::UserId.eq(user_id))
        .select_only()
        .column(pin_like::Column::PinId)
        .limit(STATUS_INDEX_CAP)
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}

/// Ids of all pins the user has saved, up to [`STATUS_INDEX_CAP`].
pub async fn saved_pin_ids<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<HashSet<Uuid>, DbErr> {
    let ids: Vec<Uuid> = pin_save::Entity::find()
        .filter(pin_save::Column::UserId.eq(user_id))
        .select_only()
        .column(pin_save::Column::PinId)
        .limit(STATUS_INDEX_CAP)
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}
