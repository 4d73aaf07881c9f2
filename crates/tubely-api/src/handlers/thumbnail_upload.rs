use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::{parse_video_id, write_back};
use crate::state::AppState;
use crate::utils::upload::{multipart_rejection, receive_upload};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::Instant;
use tubely_core::models::VideoResponse;
use tubely_processing::UploadPolicy;

#[utoipa::path(
    post,
    path = "/api/videos/{videoID}/thumbnail",
    tag = "videos",
    params(
        ("videoID" = String, Path, description = "Video ID (UUID)")
    ),
    request_body(
        content_type = "multipart/form-data",
        description = "Form with one `thumbnail` file field (image/jpeg or image/png, up to 10 MiB)"
    ),
    responses(
        (status = 200, description = "Thumbnail stored", body = VideoResponse),
        (status = 400, description = "Invalid ID or malformed multipart body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File exceeds 10 MiB", body = ErrorResponse),
        (status = 415, description = "Content type is not an allowed image type", body = ErrorResponse),
        (status = 500, description = "Storage or internal failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip_all,
    fields(user_id = %auth.user_id, video_id = %video_id, operation = "upload_thumbnail")
)]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let multipart = multipart.map_err(multipart_rejection)?;
    let deadline = Instant::now() + state.config.request_timeout();

    let _lock = state.locks.acquire(video_id).await;
    state.gate.authorize(auth.user_id, video_id).await?;

    let upload = receive_upload(multipart, &UploadPolicy::THUMBNAIL, &state.pipeline).await?;
    let ingested = state
        .pipeline
        .ingest_thumbnail(upload.staged, upload.media_type, deadline)
        .await?;

    let video = write_back(
        video_id,
        ingested.key.as_str(),
        state
            .videos
            .set_thumbnail_url(video_id, &ingested.url, Utc::now()),
    )
    .await?;

    tracing::info!(video_id = %video.id, key = %ingested.key, "Thumbnail upload completed");

    let response = state.resolver.sign(video).await?;
    Ok(Json(response))
}
