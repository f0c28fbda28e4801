use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use common::ContentHash;
use sea_orm::*;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::entity::media_object;
use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{hash}",
    tag = "Media",
    operation_id = "getMedia",
    summary = "Serve a stored image",
    description = "Streams the image stored under the given content hash. Content-addressed objects never change, so responses carry an immutable cache policy and honor `If-None-Match`.",
    params(("hash" = String, Path, description = "Hex SHA-256 content hash")),
    responses(
        (status = 200, description = "The image bytes"),
        (status = 304, description = "Client copy is current"),
        (status = 400, description = "Malformed hash (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "No such object (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn get_media(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let content_hash: ContentHash = hash
        .parse()
        .map_err(|_| AppError::Validation("Malformed content hash".into()))?;

    let record = media_object::Entity::find_by_id(content_hash.to_hex())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".into()))?;

    // The hash is the object's identity, which makes it a perfect ETag.
    let etag_value = format!("\"{}\"", record.content_hash);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let reader = state.media.get_stream(&content_hash).await?;
    let stream = ReaderStream::new(reader);
    let body = Body::from_stream(stream);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, &record.content_type)
        .header(header::CONTENT_LENGTH, record.size.to_string())
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}
