use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::warn;
use uuid::Uuid;

use crate::entity::{pin, pin_like, pin_save};
use crate::error::AppError;
use crate::feed::status;
use crate::models::shared::escape_like;

/// A pin together with the viewer's like/save state.
///
/// `liked`/`saved` are `None` for anonymous requests, where no status
/// lookup runs at all.
#[derive(Debug, Clone)]
pub struct PinWithStatus {
    pub pin: pin::Model,
    pub liked: Option<bool>,
    pub saved: Option<bool>,
}

/// Feed page, optionally filtered by a search term.
///
/// With a term, title, description and tags are matched concurrently and
/// the three result sets are unioned before paging.
pub async fn get_pins(
    db: &DatabaseConnection,
    limit: u64,
    search: &str,
    offset: u64,
    viewer: Option<i32>,
) -> Result<Vec<PinWithStatus>, AppError> {
    let term = search.trim();
    let pins = if term.is_empty() {
        feed_order(pin::Entity::find())
            .limit(limit)
            .offset(offset)
            .all(db)
            .await?
    } else {
        search_pins(db, term, limit, offset).await?
    };

    Ok(attach_viewer_status(db, pins, viewer).await)
}

/// Single pin by id, enriched for the viewer.
pub async fn get_pin(
    db: &DatabaseConnection,
    pin_id: Uuid,
    viewer: Option<i32>,
) -> Result<PinWithStatus, AppError> {
    let pin = find_pin(db, pin_id).await?;
    let mut enriched = attach_viewer_status(db, vec![pin], viewer).await;
    enriched
        .pop()
        .ok_or_else(|| AppError::Internal("enrichment dropped a pin".into()))
}

/// Pins created by `target_user_id`, newest first.
pub async fn get_created_pins_by_user(
    db: &DatabaseConnection,
    limit: u64,
    offset: u64,
    target_user_id: i32,
    viewer: Option<i32>,
) -> Result<Vec<PinWithStatus>, AppError> {
    let pins = feed_order(pin::Entity::find().filter(pin::Column::CreatedBy.eq(target_user_id)))
        .limit(limit)
        .offset(offset)
        .all(db)
        .await?;

    Ok(attach_viewer_status(db, pins, viewer).await)
}

/// Pins `target_user_id` has liked, most recently liked first.
///
/// Pages the link table, then fetches the pins by id. The enrichment
/// viewer may be a different user than the listing target.
pub async fn get_liked_pins_by_user(
    db: &DatabaseConnection,
    limit: u64,
    offset: u64,
    target_user_id: i32,
    viewer: Option<i32>,
) -> Result<Vec<PinWithStatus>, AppError> {
    let pin_ids: Vec<Uuid> = pin_like::Entity::find()
        .filter(pin_like::Column::UserId.eq(target_user_id))
        .order_by_desc(pin_like::Column::CreatedAt)
        .select_only()
        .column(pin_like::Column::PinId)
        .limit(limit)
        .offset(offset)
        .into_tuple()
        .all(db)
        .await?;

    if pin_ids.is_empty() {
        return Ok(Vec::new());
    }

    let pins = fetch_in_link_order(db, &pin_ids).await?;
    Ok(attach_viewer_status(db, pins, viewer).await)
}

/// Pins `target_user_id` has saved, most recently saved first.
pub async fn get_saved_pins_by_user(
    db: &DatabaseConnection,
    limit: u64,
    offset: u64,
    target_user_id: i32,
    viewer: Option<i32>,
) -> Result<Vec<PinWithStatus>, AppError> {
    let pin_ids: Vec<Uuid> = pin_save::Entity::find()
        .filter(pin_save::Column::UserId.eq(target_user_id))
        .order_by_desc(pin_save::Column::CreatedAt)
        .select_only()
        .column(pin_save::Column::PinId)
        .limit(limit)
        .offset(offset)
        .into_tuple()
        .all(db)
        .await?;

    if pin_ids.is_empty() {
        return Ok(Vec::new());
    }

    let pins = fetch_in_link_order(db, &pin_ids).await?;
    Ok(attach_viewer_status(db, pins, viewer).await)
}

/// Decorate pins with the viewer's like/save state.
///
/// Anonymous viewers skip the lookup entirely. A failed lookup degrades
/// that side to "nothing liked/saved" instead of failing the listing.
pub async fn attach_viewer_status(
    db: &DatabaseConnection,
    pins: Vec<pin::Model>,
    viewer: Option<i32>,
) -> Vec<PinWithStatus> {
    let Some(viewer_id) = viewer else {
        return pins
            .into_iter()
            .map(|pin| PinWithStatus {
                pin,
                liked: None,
                saved: None,
            })
            .collect();
    };

    if pins.is_empty() {
        return Vec::new();
    }

    let (liked_ids, saved_ids) = tokio::join!(
        status::liked_pin_ids(db, viewer_id),
        status::saved_pin_ids(db, viewer_id)
    );

    let liked_ids = liked_ids.unwrap_or_else(|e| {
        warn!("Liked-pin lookup failed for user {}: {}", viewer_id, e);
        HashSet::new()
    });
    let saved_ids = saved_ids.unwrap_or_else(|e| {
        warn!("Saved-pin lookup failed for user {}: {}", viewer_id, e);
        HashSet::new()
    });

    pins.into_iter()
        .map(|pin| {
            let liked = Some(liked_ids.contains(&pin.id));
            let saved = Some(saved_ids.contains(&pin.id));
            PinWithStatus { pin, liked, saved }
        })
        .collect()
}

/// Listing endpoints serve an empty page rather than failing when the
/// fetch layer errors. Mutations never degrade this way.
pub fn degrade_to_empty(
    result: Result<Vec<PinWithStatus>, AppError>,
    context: &str,
) -> Vec<PinWithStatus> {
    match result {
        Ok(pins) => pins,
        Err(e) => {
            warn!("{} failed, serving empty page: {:?}", context, e);
            Vec::new()
        }
    }
}

/// Record a like. A repeat like is a no-op; the link row and the
/// denormalized counter move together in one transaction.
pub async fn like_pin(db: &DatabaseConnection, user_id: i32, pin_id: Uuid) -> Result<(), AppError> {
    let txn = db.begin().await?;
    find_pin(&txn, pin_id).await?;

    if pin_like::Entity::find_by_id((user_id, pin_id))
        .one(&txn)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let link = pin_like::ActiveModel {
        user_id: Set(user_id),
        pin_id: Set(pin_id),
        created_at: Set(Utc::now()),
    };

    match link.insert(&txn).await {
        Ok(_) => {}
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            // Lost a race against an identical like. Nothing left to do.
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    pin::Entity::update_many()
        .col_expr(pin::Column::Likes, Expr::col(pin::Column::Likes).add(1))
        .filter(pin::Column::Id.eq(pin_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(())
}

/// Remove a like. Unliking a pin that was never liked is a no-op.
pub async fn unlike_pin(
    db: &DatabaseConnection,
    user_id: i32,
    pin_id: Uuid,
) -> Result<(), AppError> {
    let txn = db.begin().await?;

    let Some(link) = pin_like::Entity::find_by_id((user_id, pin_id))
        .one(&txn)
        .await?
    else {
        return Ok(());
    };

    let active: pin_like::ActiveModel = link.into();
    active.delete(&txn).await?;

    // The `likes > 0` filter is the floor: a counter already at zero
    // stays there.
    pin::Entity::update_many()
        .col_expr(pin::Column::Likes, Expr::col(pin::Column::Likes).sub(1))
        .filter(pin::Column::Id.eq(pin_id))
        .filter(pin::Column::Likes.gt(0))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(())
}

/// Record a save. Mirrors [`like_pin`] over the save link table.
pub async fn save_pin(db: &DatabaseConnection, user_id: i32, pin_id: Uuid) -> Result<(), AppError> {
    let txn = db.begin().await?;
    find_pin(&txn, pin_id).await?;

    if pin_save::Entity::find_by_id((user_id, pin_id))
        .one(&txn)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let link = pin_save::ActiveModel {
        user_id: Set(user_id),
        pin_id: Set(pin_id),
        created_at: Set(Utc::now()),
    };

    match link.insert(&txn).await {
        Ok(_) => {}
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    pin::Entity::update_many()
        .col_expr(pin::Column::Saves, Expr::col(pin::Column::Saves).add(1))
        .filter(pin::Column::Id.eq(pin_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(())
}

/// Remove a save. Mirrors [`unlike_pin`].
pub async fn unsave_pin(
    db: &DatabaseConnection,
    user_id: i32,
    pin_id: Uuid,
) -> Result<(), AppError> {
    let txn = db.begin().await?;

    let Some(link) = pin_save::Entity::find_by_id((user_id, pin_id))
        .one(&txn)
        .await?
    else {
        return Ok(());
    };

    let active: pin_save::ActiveModel = link.into();
    active.delete(&txn).await?;

    pin::Entity::update_many()
        .col_expr(pin::Column::Saves, Expr::col(pin::Column::Saves).sub(1))
        .filter(pin::Column::Id.eq(pin_id))
        .filter(pin::Column::Saves.gt(0))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(())
}

/// Find a pin by ID or return 404.
pub async fn find_pin<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<pin::Model, AppError> {
    pin::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Pin not found".into()))
}

fn feed_order(select: Select<pin::Entity>) -> Select<pin::Entity> {
    // UUIDv7 ids are time-ordered, so the id tiebreak keeps pagination
    // stable for pins created in the same instant.
    select
        .order_by_desc(pin::Column::CreatedAt)
        .order_by_desc(pin::Column::Id)
}

async fn search_pins(
    db: &DatabaseConnection,
    term: &str,
    limit: u64,
    offset: u64,
) -> Result<Vec<pin::Model>, AppError> {
    // Each branch fetches the whole window up to the requested page so
    // the union can be paged without repeating or skipping pins.
    let window = offset.saturating_add(limit);
    let pattern = format!("%{}%", escape_like(term).to_lowercase());

    let (title_hits, description_hits, tag_hits) = tokio::try_join!(
        field_matches(db, pin::Column::Title, &pattern, window),
        field_matches(db, pin::Column::Description, &pattern, window),
        tag_matches(db, &pattern, window),
    )?;

    Ok(union_first_seen(
        vec![title_hits, description_hits, tag_hits],
        offset,
        limit,
    ))
}

async fn field_matches(
    db: &DatabaseConnection,
    column: pin::Column,
    pattern: &str,
    window: u64,
) -> Result<Vec<pin::Model>, DbErr> {
    feed_order(pin::Entity::find().filter(
        Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\')),
    ))
    .limit(window)
    .all(db)
    .await
}

async fn tag_matches(
    db: &DatabaseConnection,
    pattern: &str,
    window: u64,
) -> Result<Vec<pin::Model>, DbErr> {
    // Tags are a JSON array; match against its text form.
    feed_order(pin::Entity::find().filter(Expr::cust_with_values(
        r#"lower(CAST("tags" AS TEXT)) LIKE ? ESCAPE '\'"#,
        [pattern.to_owned()],
    )))
    .limit(window)
    .all(db)
    .await
}

/// Union the per-field result sets keeping the first occurrence of each
/// pin (title hits before description hits before tag hits), then page
/// the union.
fn union_first_seen(branches: Vec<Vec<pin::Model>>, offset: u64, limit: u64) -> Vec<pin::Model> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for pin in branches.into_iter().flatten() {
        if seen.insert(pin.id) {
            merged.push(pin);
        }
    }

    merged
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

async fn fetch_in_link_order(
    db: &DatabaseConnection,
    ids: &[Uuid],
) -> Result<Vec<pin::Model>, DbErr> {
    let fetched = pin::Entity::find()
        .filter(pin::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    Ok(restore_order(ids, fetched))
}

/// `IN` fetches come back in arbitrary order; restore the link-page order.
/// Ids whose pin row vanished are dropped.
fn restore_order(ids: &[Uuid], fetched: Vec<pin::Model>) -> Vec<pin::Model> {
    let mut by_id: HashMap<Uuid, pin::Model> = fetched.into_iter().map(|p| (p.id, p)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
