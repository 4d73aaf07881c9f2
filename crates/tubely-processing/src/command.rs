//! Subprocess execution for external media tools

use std::ffi::OsStr;
use std::process::Stdio;

use tokio::process::Command;
use tokio::time::Instant;

use crate::error::ProcessingError;

/// Longest stderr excerpt carried in an error.
const MAX_STDERR_CHARS: usize = 2048;

/// Run `program` with `args` until it exits or `deadline` passes.
///
/// The child is killed if the deadline passes or the caller is dropped.
/// Returns stdout when the process exits successfully.
pub async fn run_tool<I, S>(
    tool: &'static str,
    program: &str,
    args: I,
    deadline: Instant,
) -> Result<Vec<u8>, ProcessingError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let start = std::time::Instant::now();

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout_at(deadline, child).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(ProcessingError::ToolFailed {
                tool,
                message: format!("failed to execute {}: {}", program, e),
            })
        }
        Err(_) => {
            tracing::warn!(
                process.executable.name = tool,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Tool killed at request deadline"
            );
            return Err(ProcessingError::ToolTimedOut { tool });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr: String = stderr.trim().chars().take(MAX_STDERR_CHARS).collect();
        tracing::warn!(
            process.executable.name = tool,
            exit_status = %output.status,
            stderr = %stderr,
            "Tool exited with failure"
        );
        return Err(ProcessingError::ToolFailed {
            tool,
            message: format!("exited with {}: {}", output.status, stderr),
        });
    }

    tracing::debug!(
        process.executable.name = tool,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Tool finished"
    );
    Ok(output.stdout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn deadline(ms: u64) -> Instant {
        Instant::now() + Duration::from_millis(ms)
    }

    #[tokio::test]
    async fn test_stdout_returned_on_success() {
        let out = run_tool("sh", "sh", ["-c", "printf hello"], deadline(5_000))
            .await
            .unwrap();
        assert_eq!(out, b"hello");
    }

    #[tokio::test]
    async fn test_non_zero_exit_carries_stderr() {
        let err = run_tool("sh", "sh", ["-c", "echo broken >&2; exit 3"], deadline(5_000))
            .await
            .unwrap_err();
        match err {
            ProcessingError::ToolFailed { tool, message } => {
                assert_eq!(tool, "sh");
                assert!(message.contains("broken"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_failure() {
        let err = run_tool(
            "ffprobe",
            "/nonexistent/tubely-ffprobe",
            ["-version"],
            deadline(5_000),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProcessingError::ToolFailed { tool: "ffprobe", .. }));
    }

    #[tokio::test]
    async fn test_deadline_kills_slow_tool() {
        let started = std::time::Instant::now();
        let err = run_tool("sleep", "sleep", ["10"], deadline(200))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::ToolTimedOut { tool: "sleep" }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
