//! External media tool invocation.
//!
//! ffprobe and ffmpeg are reached only through [`MediaTool`], so the pipeline
//! can run against a scripted double in tests.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Captured result of one tool run
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("Failed to collect output of {program}: {source}")]
    Output {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Executable name, for logs.
    fn program(&self) -> &str;

    /// Run the tool to completion with `args`.
    ///
    /// A non-zero exit is not an error at this level; callers inspect
    /// [`ToolOutput::success`].
    async fn run(&self, args: &[String]) -> Result<ToolOutput, ToolError>;
}

/// Runs a real executable with a bounded wall-clock time.
#[derive(Debug, Clone)]
pub struct CommandTool {
    program: String,
    timeout: Duration,
}

impl CommandTool {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MediaTool for CommandTool {
    fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, args: &[String]) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();

        // kill_on_drop: a timed out or cancelled run must not leave the child behind.
        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // wait_with_output drains stdout and stderr concurrently with the wait.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(ToolError::Output {
                    program: self.program.clone(),
                    source,
                })
            }
            Err(_) => {
                tracing::warn!(
                    program = %self.program,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Media tool timed out and was killed"
                );
                return Err(ToolError::Timeout {
                    program: self.program.clone(),
                    timeout: self.timeout,
                });
            }
        };

        tracing::debug!(
            program = %self.program,
            status = ?output.status.code(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Media tool finished"
        );

        Ok(ToolOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_captures_streams_and_status() {
        let tool = CommandTool::new("sh", Duration::from_secs(10));
        let output = tool
            .run(&sh("echo out; echo err >&2; exit 3"))
            .await
            .unwrap();

        assert!(!output.success());
        assert_eq!(output.status, Some(3));
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "out");
        assert_eq!(output.stderr_text(), "err");
    }

    #[tokio::test]
    async fn test_success() {
        let tool = CommandTool::new("sh", Duration::from_secs(10));
        let output = tool.run(&sh("exit 0")).await.unwrap();
        assert!(output.success());
    }

    #[tokio::test]
    async fn test_timeout() {
        let tool = CommandTool::new("sh", Duration::from_millis(100));
        let result = tool.run(&sh("sleep 5")).await;
        assert!(matches!(result, Err(ToolError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let tool = CommandTool::new("clipvault-no-such-tool", Duration::from_secs(1));
        let result = tool.run(&[]).await;
        assert!(matches!(result, Err(ToolError::Spawn { .. })));
    }
}
