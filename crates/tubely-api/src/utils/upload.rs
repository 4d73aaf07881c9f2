//! Multipart upload receiver
//!
//! Streams the single file field an upload flow expects straight into the
//! staging directory. The declared content type is checked before any byte is
//! read.

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use tubely_core::AppError;
use tubely_processing::{BodyLimitExceeded, IngestPipeline, MediaType, StagedFile, UploadPolicy};

/// A staged upload and its validated media type
#[derive(Debug)]
pub struct ReceivedUpload {
    pub staged: StagedFile,
    pub media_type: MediaType,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart: {}", err.body_text()))
    }
}

fn field_read_error(err: MultipartError) -> std::io::Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        std::io::Error::other(BodyLimitExceeded)
    } else {
        std::io::Error::other(err)
    }
}

/// Map the extractor's rejection (e.g. a non-multipart body) to a client error.
pub fn multipart_rejection(rejection: MultipartRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}

/// Stage the policy's file field. Exactly one such field is accepted; other
/// fields are skipped.
pub async fn receive_upload(
    mut multipart: Multipart,
    policy: &UploadPolicy,
    pipeline: &IngestPipeline,
) -> Result<ReceivedUpload, AppError> {
    let mut received: Option<ReceivedUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(policy.field_name) {
            continue;
        }

        if received.is_some() {
            return Err(AppError::BadRequest(format!(
                "Multiple '{}' fields are not allowed; send exactly one",
                policy.field_name
            )));
        }

        let media_type = policy.accept(field.content_type())?;
        let reader = StreamReader::new(Box::pin(field.map_err(field_read_error)));
        let staged = pipeline.stage(reader, policy, media_type).await?;

        tracing::debug!(
            field = policy.field_name,
            mime = media_type.mime(),
            size_bytes = staged.size(),
            "Upload received"
        );
        received = Some(ReceivedUpload { staged, media_type });
    }

    received.ok_or_else(|| {
        AppError::BadRequest(format!("Missing '{}' file field", policy.field_name))
    })
}
