use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::{info, warn};

use crate::config::SeedConfig;
use crate::entity::{pin, pin_like, pin_save, user};
use crate::utils::avatar::PLACEHOLDER_AVATAR;
use crate::utils::hash;

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Feed pagination: ORDER BY created_at DESC, id DESC
    create_index(
        db,
        Index::create()
            .if_not_exists()
            .name("idx_pin_created_id")
            .table(pin::Entity)
            .col(pin::Column::CreatedAt)
            .col(pin::Column::Id)
            .to_string(PostgresQueryBuilder),
        "idx_pin_created_id",
    )
    .await;

    // Created-pins listing: WHERE created_by = ? ORDER BY created_at DESC
    create_index(
        db,
        Index::create()
            .if_not_exists()
            .name("idx_pin_creator_created")
            .table(pin::Entity)
            .col(pin::Column::CreatedBy)
            .col(pin::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        "idx_pin_creator_created",
    )
    .await;

    // Liked/saved listings page the link tables by recency per user.
    create_index(
        db,
        Index::create()
            .if_not_exists()
            .name("idx_pin_like_user_created")
            .table(pin_like::Entity)
            .col(pin_like::Column::UserId)
            .col(pin_like::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        "idx_pin_like_user_created",
    )
    .await;

    create_index(
        db,
        Index::create()
            .if_not_exists()
            .name("idx_pin_save_user_created")
            .table(pin_save::Entity)
            .col(pin_save::Column::UserId)
            .col(pin_save::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        "idx_pin_save_user_created",
    )
    .await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, stmt: String, name: &str) {
    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => warn!("Failed to create index {}: {}", name, e),
    }
}

/// Seed the demo guest account when `seed.guest_enabled` is set.
///
/// Idempotent: re-running against an existing guest changes nothing,
/// including its password.
pub async fn ensure_guest_user(db: &DatabaseConnection, config: &SeedConfig) -> Result<(), DbErr> {
    if !config.guest_enabled {
        return Ok(());
    }

    let password_hash = hash::hash_password(&config.guest_password)
        .map_err(|e| DbErr::Custom(format!("Failed to hash guest password: {e}")))?;

    let guest = user::ActiveModel {
        name: Set("Guest".to_string()),
        email: Set(config.guest_email.trim().to_lowercase()),
        password_hash: Set(password_hash),
        avatar_url: Set(PLACEHOLDER_AVATAR.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = user::Entity::insert(guest)
        .on_conflict(
            OnConflict::column(user::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => {
            info!("Seeded guest account {}", config.guest_email);
            Ok(())
        }
        Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e),
    }
}
