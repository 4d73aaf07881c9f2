pub mod health;
pub mod media;
pub mod thumbnail_upload;
pub mod video_get;
pub mod video_upload;

use std::future::Future;
use tubely_core::models::Video;
use tubely_core::AppError;
use uuid::Uuid;

/// Parse the `{videoID}` path segment.
pub(crate) fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Ok(Uuid::parse_str(raw)?)
}

/// Run the metadata update that follows a stored asset.
///
/// The stored object is not removed when this fails; the key is logged so the
/// orphan can be found.
pub(crate) async fn write_back<F>(
    video_id: Uuid,
    stored_key: &str,
    update: F,
) -> Result<Video, AppError>
where
    F: Future<Output = Result<Video, AppError>>,
{
    update.await.inspect_err(|e| {
        tracing::warn!(
            error = %e,
            video_id = %video_id,
            key = %stored_key,
            "Metadata write-back failed; stored object is orphaned"
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_video_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_video_id("not-a-uuid"),
            Err(AppError::InvalidIdentifier(_))
        ));
    }
}
