use service_core::error::AppError;
use std::ffi::OsStr;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Longest stderr excerpt carried into an error message.
const STDERR_EXCERPT: usize = 2048;

/// Runs external programs with a hard timeout. The child is killed if the
/// timeout elapses or the awaiting request is dropped.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn execute<S: AsRef<OsStr>>(
        &self,
        program: &str,
        args: &[S],
    ) -> Result<Output, AppError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let rendered_args: Vec<_> = args.iter().map(|a| a.as_ref().to_string_lossy()).collect();
        tracing::debug!(
            program = %program,
            args = ?rendered_args,
            timeout_secs = %self.timeout.as_secs(),
            "Executing command"
        );

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                AppError::ConversionFailed(anyhow::anyhow!(
                    "{} timed out after {:?}",
                    program,
                    self.timeout
                ))
            })?
            .map_err(|e| {
                AppError::ConversionFailed(anyhow::anyhow!("Failed to run {}: {}", program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            tracing::error!(
                program = %program,
                args = ?rendered_args,
                status = ?output.status.code(),
                stderr = %stderr,
                "Command failed"
            );
            let excerpt: String = stderr.chars().take(STDERR_EXCERPT).collect();
            return Err(AppError::ConversionFailed(match output.status.code() {
                Some(code) if excerpt.is_empty() => {
                    anyhow::anyhow!("{} exited with status {}", program, code)
                }
                Some(code) => anyhow::anyhow!("{} exited with status {}: {}", program, code, excerpt),
                None => anyhow::anyhow!("{} was terminated by a signal", program),
            }));
        }

        tracing::debug!(
            program = %program,
            output_size = output.stdout.len(),
            "Command succeeded"
        );

        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_on_success() {
        let executor = CommandExecutor::new(Duration::from_secs(5));
        let output = executor.execute("sh", &["-c", "printf converted"]).await.unwrap();
        assert_eq!(output.stdout, b"converted");
    }

    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let executor = CommandExecutor::new(Duration::from_secs(5));
        let err = executor
            .execute("sh", &["-c", "echo 'bad xref table' >&2; exit 3"])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ConversionFailed(_)));
        let message = err.to_string();
        assert!(message.contains("status 3"), "{}", message);
        assert!(message.contains("bad xref table"), "{}", message);
    }

    #[tokio::test]
    async fn missing_program_is_a_conversion_failure() {
        let executor = CommandExecutor::new(Duration::from_secs(5));
        let err = executor
            .execute("definitely-not-a-converter-binary", &["x"])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConversionFailed(_)));
    }

    #[tokio::test]
    async fn slow_commands_time_out() {
        let executor = CommandExecutor::new(Duration::from_millis(200));
        let err = executor.execute("sleep", &["5"]).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
