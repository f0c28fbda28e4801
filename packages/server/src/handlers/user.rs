use axum::extract::{Path, Query, State};
use axum::Json;
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::feed::service;
use crate::models::pin::{PinResponse, UserPinsQuery};
use crate::models::shared::page_window;
use crate::models::user::UserResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Public profile of a user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "The profile", body = UserResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/{id}/pins",
    tag = "Users",
    operation_id = "userCreatedPins",
    summary = "Pins a user has created",
    description = "Newest first. An unknown user lists as empty. With a bearer token each pin carries the requester's own `liked`/`saved` state, whoever the profile belongs to.",
    params(("id" = i32, Path, description = "User ID"), UserPinsQuery),
    responses(
        (status = 200, description = "Page of pins", body = Vec<PinResponse>),
        (status = 401, description = "Malformed bearer token (TOKEN_INVALID)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer, query))]
pub async fn created_pins(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<UserPinsQuery>,
) -> Json<Vec<PinResponse>> {
    let (limit, offset) = page_window(query.limit, query.offset);
    let viewer_id = viewer.map(|u| u.user_id);

    let result = service::get_created_pins_by_user(&state.db, limit, offset, id, viewer_id).await;
    let pins = service::degrade_to_empty(result, "Created-pins query");

    Json(pins.into_iter().map(PinResponse::from).collect())
}

#[utoipa::path(
    get,
    path = "/{id}/liked",
    tag = "Users",
    operation_id = "userLikedPins",
    summary = "Pins a user has liked",
    description = "Most recently liked first. The `liked`/`saved` flags still describe the requester, not the profile owner.",
    params(("id" = i32, Path, description = "User ID"), UserPinsQuery),
    responses(
        (status = 200, description = "Page of pins", body = Vec<PinResponse>),
        (status = 401, description = "Malformed bearer token (TOKEN_INVALID)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer, query))]
pub async fn liked_pins(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<UserPinsQuery>,
) -> Json<Vec<PinResponse>> {
    let (limit, offset) = page_window(query.limit, query.offset);
    let viewer_id = viewer.map(|u| u.user_id);

    let result = service::get_liked_pins_by_user(&state.db, limit, offset, id, viewer_id).await;
    let pins = service::degrade_to_empty(result, "Liked-pins query");

    Json(pins.into_iter().map(PinResponse::from).collect())
}

#[utoipa::path(
    get,
    path = "/{id}/saved",
    tag = "Users",
    operation_id = "userSavedPins",
    summary = "Pins a user has saved",
    description = "Most recently saved first. The `liked`/`saved` flags still describe the requester, not the profile owner.",
    params(("id" = i32, Path, description = "User ID"), UserPinsQuery),
    responses(
        (status = 200, description = "Page of pins", body = Vec<PinResponse>),
        (status = 401, description = "Malformed bearer token (TOKEN_INVALID)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer, query))]
pub async fn saved_pins(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<UserPinsQuery>,
) -> Json<Vec<PinResponse>> {
    let (limit, offset) = page_window(query.limit, query.offset);
    let viewer_id = viewer.map(|u| u.user_id);

    let result = service::get_saved_pins_by_user(&state.db, limit, offset, id, viewer_id).await;
    let pins = service::degrade_to_empty(result, "Saved-pins query");

    Json(pins.into_iter().map(PinResponse::from).collect())
}
