//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; anything that
//! converts into `AppError` converts into `HttpAppError` and renders the same
//! way (status, body, logging).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tubely_core::{AppError, ErrorMetadata, LogLevel};
use tubely_processing::ProcessingError;
use tubely_storage::StorageError;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether retrying the request may succeed
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    fn from_app_error(app_error: &AppError, include_details: bool) -> Self {
        Self {
            error: app_error.client_message(),
            details: include_details.then(|| app_error.detailed_message()),
            error_type: include_details.then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
///
/// Needed because of the orphan rule: IntoResponse (axum) cannot be
/// implemented for AppError (tubely-core) here.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<ProcessingError> for HttpAppError {
    fn from(err: ProcessingError) -> Self {
        HttpAppError(err.into())
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error.detailed_message(), error_type = error_type, "Error occurred");
        }
    }
}

/// Body with details, kept on the response for [`expose_error_details`].
#[derive(Clone)]
struct DetailedErrorBody(ErrorResponse);

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse::from_app_error(app_error, false);
        let mut response = (status, Json(body)).into_response();

        // Sensitive errors never carry details.
        if !app_error.is_sensitive() {
            response
                .extensions_mut()
                .insert(DetailedErrorBody(ErrorResponse::from_app_error(app_error, true)));
        }
        response
    }
}

/// Swap error bodies for their detailed form when `show_details` is set.
///
/// Layered with `!config.is_production()`, so production responses keep the
/// bare body.
pub async fn expose_error_details(
    State(show_details): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<DetailedErrorBody>() {
        Some(DetailedErrorBody(body)) if show_details => {
            let status = response.status();
            (status, Json(body)).into_response()
        }
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error_not_found() {
        let HttpAppError(app_err) = StorageError::NotFound("landscape/a.mp4".to_string()).into();
        assert!(matches!(app_err, AppError::NotFound(_)));
    }

    #[test]
    fn test_from_storage_error_upload_failed() {
        let HttpAppError(app_err) = StorageError::UploadFailed("connection reset".to_string()).into();
        match app_err {
            AppError::StorageFailure(msg) => assert!(msg.contains("connection reset")),
            other => panic!("Expected StorageFailure variant, got {other:?}"),
        }
    }

    #[test]
    fn test_from_processing_error_unsupported_type() {
        let HttpAppError(app_err) =
            ProcessingError::UnsupportedMediaType("image/gif".to_string()).into();
        assert_eq!(app_err.http_status_code(), 415);
    }

    #[test]
    fn test_sensitive_errors_render_without_details() {
        let app_err = AppError::StorageFailure("bucket policy denied".to_string());
        let body = ErrorResponse::from_app_error(&app_err, false);
        assert_eq!(body.error, "Failed to access storage");
        assert!(body.details.is_none());
        assert_eq!(body.code, "STORAGE_FAILURE");
        assert!(body.recoverable);
    }

    #[test]
    fn test_status_code_of_rendered_response() {
        let response = HttpAppError(AppError::Unauthorized("not owner".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let response = HttpAppError(AppError::PayloadTooLarge("big".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    fn failing_router(show_details: bool) -> axum::Router {
        axum::Router::new()
            .route(
                "/missing",
                axum::routing::get(|| async {
                    Err::<(), _>(HttpAppError(AppError::NotFound("video abc".to_string())))
                }),
            )
            .route(
                "/store",
                axum::routing::get(|| async {
                    Err::<(), _>(HttpAppError(AppError::StorageFailure(
                        "bucket policy denied".to_string(),
                    )))
                }),
            )
            .layer(axum::middleware::from_fn_with_state(
                show_details,
                expose_error_details,
            ))
    }

    #[tokio::test]
    async fn test_details_follow_configured_environment() {
        let development = axum_test::TestServer::new(failing_router(true).into_make_service())
            .expect("test server");
        let body: ErrorResponse = development.get("/missing").await.json();
        assert_eq!(body.error_type.as_deref(), Some("NotFound"));
        assert!(body.details.is_some());

        // Sensitive errors stay bare outside production too.
        let body: ErrorResponse = development.get("/store").await.json();
        assert!(body.details.is_none());

        let production = axum_test::TestServer::new(failing_router(false).into_make_service())
            .expect("test server");
        let response = production.get("/missing").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert!(body.details.is_none());
        assert!(body.error_type.is_none());
        assert_eq!(body.code, "NOT_FOUND");
    }

    /// Serialized ErrorResponse has "error", "code", "recoverable", and
    /// optionally "details" / "error_type" / "suggested_action".
    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Not found".to_string(),
            details: Some("Resource not found".to_string()),
            error_type: Some("NotFound".to_string()),
            code: "NOT_FOUND".to_string(),
            recoverable: false,
            suggested_action: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json.get("code").and_then(|v| v.as_str()), Some("NOT_FOUND"));
        assert!(json.get("recoverable").and_then(|v| v.as_bool()).is_some());
        assert!(json.get("suggested_action").is_none());
    }
}
