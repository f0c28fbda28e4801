use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{media_object, pin, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::feed::service::{self, PinWithStatus};
use crate::models::pin::{normalize_tags, FeedQuery, PinResponse};
use crate::models::shared::page_window;
use crate::state::AppState;

/// Slack on top of the image cap for multipart framing and form fields.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[utoipa::path(
    get,
    path = "/",
    tag = "Pins",
    operation_id = "listPins",
    summary = "Browse the pin feed",
    description = "Returns a page of pins, newest first. With `search`, title, description and tags are matched case-insensitively and the results merged. With a bearer token each pin carries `liked`/`saved` for the requesting user. Fetch-layer failures degrade to an empty page.",
    params(FeedQuery),
    responses(
        (status = 200, description = "Page of pins", body = Vec<PinResponse>),
        (status = 401, description = "Malformed bearer token (TOKEN_INVALID)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer, query))]
pub async fn list_pins(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Json<Vec<PinResponse>> {
    let (limit, offset) = page_window(query.limit, query.offset);
    let search = query.search.as_deref().unwrap_or("");
    let viewer_id = viewer.map(|u| u.user_id);

    let result = service::get_pins(&state.db, limit, search, offset, viewer_id).await;
    let pins = service::degrade_to_empty(result, "Feed query");

    Json(pins.into_iter().map(PinResponse::from).collect())
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Pins",
    operation_id = "getPin",
    summary = "Fetch a single pin",
    params(("id" = Uuid, Path, description = "Pin ID")),
    responses(
        (status = 200, description = "The pin", body = PinResponse),
        (status = 401, description = "Malformed bearer token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Pin not found (NOT_FOUND)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer))]
pub async fn get_pin(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PinResponse>, AppError> {
    let viewer_id = viewer.map(|u| u.user_id);
    let pin = service::get_pin(&state.db, id, viewer_id).await?;
    Ok(Json(PinResponse::from(pin)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Pins",
    operation_id = "createPin",
    summary = "Upload an image as a new pin",
    description = "Accepts a multipart form with a `file` field holding the image. The image is stored content-addressed, then captioned to produce the pin's title, description and tags. Captioning failures abort the pin with 502; the stored image is reused on retry.",
    request_body(content_type = "multipart/form-data", description = "Form with a `file` image field"),
    responses(
        (status = 201, description = "Pin created", body = PinResponse),
        (status = 400, description = "Missing or non-image upload (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "Image exceeds the size cap (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 502, description = "Captioning failed (CAPTIONING_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn create_pin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut image: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            let content_type = field
                .content_type()
                .map(str::to_owned)
                .or_else(|| {
                    field
                        .file_name()
                        .map(|name| mime_guess::from_path(name).first_or_octet_stream().to_string())
                })
                .ok_or_else(|| AppError::Validation("Image has no content type".into()))?;
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read image: {e}")))?;
            image = Some((content_type, data.to_vec()));
            break;
        }
    }

    let (content_type, data) =
        image.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    if !content_type.starts_with("image/") {
        return Err(AppError::Validation(format!(
            "Expected an image upload, got {content_type}"
        )));
    }
    if data.is_empty() {
        return Err(AppError::Validation("Image is empty".into()));
    }
    if data.len() as u64 > state.config.storage.max_image_size {
        return Err(AppError::PayloadTooLarge);
    }

    let content_hash = state.media.put(&data).await?;
    record_media_object(&state, &content_hash.to_hex(), &content_type, data.len()).await?;

    let caption = state.captioner.caption(&data, &content_type).await?;
    let tags = normalize_tags(caption.tags);

    let creator = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let new_pin = pin::ActiveModel {
        id: Set(Uuid::now_v7()),
        title: Set(caption.title),
        description: Set(caption.description),
        tags: Set(serde_json::Value::from(tags)),
        image_url: Set(format!("/api/v1/media/{}", content_hash)),
        created_by: Set(creator.id),
        username: Set(creator.name),
        likes: Set(0),
        saves: Set(0),
        created_at: Set(chrono::Utc::now()),
    };

    let model = new_pin.insert(&state.db).await?;

    // A brand-new pin cannot be liked or saved yet, so the creator's
    // status needs no lookup.
    let response = PinResponse::from(PinWithStatus {
        pin: model,
        liked: Some(false),
        saved: Some(false),
    });

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/{id}/like",
    tag = "Pins",
    operation_id = "likePin",
    summary = "Like a pin",
    description = "Marks the pin as liked by the requesting user. Liking a pin twice is a no-op.",
    params(("id" = Uuid, Path, description = "Pin ID")),
    responses(
        (status = 204, description = "Pin is liked"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Pin not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn like_pin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::like_pin(&state.db, auth_user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/{id}/like",
    tag = "Pins",
    operation_id = "unlikePin",
    summary = "Remove a like",
    description = "Removes the requesting user's like. Unliking a pin that was never liked is a no-op.",
    params(("id" = Uuid, Path, description = "Pin ID")),
    responses(
        (status = 204, description = "Pin is not liked"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn unlike_pin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::unlike_pin(&state.db, auth_user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/save",
    tag = "Pins",
    operation_id = "savePin",
    summary = "Save a pin",
    description = "Adds the pin to the requesting user's saved collection. Saving twice is a no-op.",
    params(("id" = Uuid, Path, description = "Pin ID")),
    responses(
        (status = 204, description = "Pin is saved"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Pin not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn save_pin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::save_pin(&state.db, auth_user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/{id}/save",
    tag = "Pins",
    operation_id = "unsavePin",
    summary = "Remove a save",
    description = "Removes the pin from the requesting user's saved collection. A no-op if it was never saved.",
    params(("id" = Uuid, Path, description = "Pin ID")),
    responses(
        (status = 204, description = "Pin is not saved"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn unsave_pin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::unsave_pin(&state.db, auth_user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Body limit for pin uploads, sized from the configured image cap.
pub fn upload_body_limit(max_image_size: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_image_size as usize + MULTIPART_OVERHEAD)
}

/// Remember the stored image's content type and size. Re-uploads of the
/// same bytes hit the existing row and change nothing.
async fn record_media_object(
    state: &AppState,
    content_hash: &str,
    content_type: &str,
    size: usize,
) -> Result<(), AppError> {
    let record = media_object::ActiveModel {
        content_hash: Set(content_hash.to_string()),
        content_type: Set(content_type.to_string()),
        size: Set(size as i64),
        created_at: Set(chrono::Utc::now()),
    };

    let insert = media_object::Entity::insert(record)
        .on_conflict(
            OnConflict::column(media_object::Column::ContentHash)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await;

    match insert {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
