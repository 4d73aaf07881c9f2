use tubely_core::AppError;

/// Errors raised while validating, staging or transforming an upload
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("File too large (max: {max} bytes)")]
    TooLarge { max: u64 },

    #[error("Invalid content: {0}")]
    ContentInvalid(String),

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: &'static str, message: String },

    #[error("{tool} did not finish before the request deadline")]
    ToolTimedOut { tool: &'static str },

    #[error("Failed to read upload: {0}")]
    Receive(#[source] std::io::Error),

    #[error("Staging failed: {0}")]
    Staging(#[source] std::io::Error),
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::UnsupportedMediaType(mime) => {
                AppError::UnsupportedMediaType(format!("Media type not allowed: {}", mime))
            }
            ProcessingError::TooLarge { max } => {
                AppError::PayloadTooLarge(format!("File exceeds the {} byte limit", max))
            }
            ProcessingError::ContentInvalid(msg) => AppError::ContentInvalid(msg),
            ProcessingError::ToolFailed { tool, message } => AppError::ExternalToolFailure {
                tool: tool.to_string(),
                message,
            },
            ProcessingError::ToolTimedOut { tool } => AppError::ExternalToolFailure {
                tool: tool.to_string(),
                message: format!("{} did not finish before the request deadline", tool),
            },
            ProcessingError::Receive(e) => {
                AppError::BadRequest(format!("Failed to read upload: {}", e))
            }
            ProcessingError::Staging(e) => AppError::Internal(format!("Staging failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_core::ErrorMetadata;

    #[test]
    fn test_processing_errors_map_to_http_statuses() {
        let cases = [
            (ProcessingError::UnsupportedMediaType("image/gif".into()), 415),
            (ProcessingError::TooLarge { max: 10 }, 413),
            (ProcessingError::ContentInvalid("no video stream".into()), 422),
            (
                ProcessingError::ToolFailed {
                    tool: "ffmpeg",
                    message: "boom".into(),
                },
                500,
            ),
            (ProcessingError::ToolTimedOut { tool: "ffprobe" }, 500),
            (
                ProcessingError::Receive(std::io::ErrorKind::UnexpectedEof.into()),
                400,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).http_status_code(), status);
        }
    }

    #[test]
    fn test_timeout_keeps_tool_name() {
        match AppError::from(ProcessingError::ToolTimedOut { tool: "ffprobe" }) {
            AppError::ExternalToolFailure { tool, message } => {
                assert_eq!(tool, "ffprobe");
                assert!(message.contains("deadline"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
