//! Serves locally stored objects: videos behind signed URLs, thumbnails
//! publicly.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderValue},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tubely_core::AppError;
use tubely_storage::{LocalStorage, StorageError};

#[derive(Debug, Deserialize)]
pub struct SignedUrlQuery {
    pub expires: Option<u64>,
    pub signature: Option<String>,
}

fn content_type_for(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext) {
        Some("mp4") => "video/mp4",
        Some("jpg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

async fn stream_object(storage: &LocalStorage, key: &str) -> Result<Response, HttpAppError> {
    let file = storage.open(key).await?;
    let size = file.metadata().await.map(|meta| meta.len()).ok();

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(key)),
    );
    if let Some(size) = size {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    }
    Ok(response)
}

#[tracing::instrument(skip_all, fields(key = %key))]
pub async fn serve_media(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<SignedUrlQuery>,
) -> Result<Response, HttpAppError> {
    let storage = state.local_media.as_ref().ok_or_else(|| {
        AppError::NotFound("Media is not served by this instance".to_string())
    })?;

    let (Some(expires), Some(signature)) = (query.expires, query.signature.as_deref()) else {
        return Err(StorageError::InvalidSignature.into());
    };
    storage.verify_signature(&key, expires, signature)?;

    stream_object(storage, &key).await
}

#[tracing::instrument(skip_all, fields(file = %file))]
pub async fn serve_asset(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> Result<Response, HttpAppError> {
    stream_object(&state.assets, &file).await
}
