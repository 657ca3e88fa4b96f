//! Fast-start container rewrite via ffmpeg.
//!
//! Moves the `moov` atom to the front of the file so playback can begin
//! before the whole file is downloaded. Samples are copied, never re-encoded.

use super::media_tool::{MediaTool, ToolError};
use clipvault_core::constants::PROCESSED_SUFFIX;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("FFmpeg failed: {stderr}")]
    Failed { status: Option<i32>, stderr: String },

    #[error("FFmpeg reported success but wrote no output to {0}")]
    MissingOutput(PathBuf),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

#[derive(Clone)]
pub struct FastStartOptimizer {
    tool: Arc<dyn MediaTool>,
}

impl FastStartOptimizer {
    pub fn new(tool: Arc<dyn MediaTool>) -> Self {
        Self { tool }
    }

    /// Sibling path the rewrite is written to: the input name plus `.processed`.
    pub fn output_path(input: &Path) -> PathBuf {
        let mut name = input.as_os_str().to_owned();
        name.push(PROCESSED_SUFFIX);
        PathBuf::from(name)
    }

    pub fn args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-movflags".to_string(),
            "faststart".to_string(),
            "-map_metadata".to_string(),
            "0".to_string(),
            "-codec".to_string(),
            "copy".to_string(),
            "-f".to_string(),
            "mp4".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }

    /// Rewrite `input` next to itself and return the new path.
    ///
    /// The caller owns both files afterwards.
    pub async fn optimize(&self, input: &Path) -> Result<PathBuf, TranscodeError> {
        let output = Self::output_path(input);
        self.rewrite(input, &output).await?;
        Ok(output)
    }

    /// Rewrite `input` into `output`.
    #[tracing::instrument(skip(self), fields(
        process.executable.name = %self.tool.program(),
        ffmpeg.operation = "faststart",
        input = %input.display()
    ))]
    pub async fn rewrite(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let start = std::time::Instant::now();
        let result = self.tool.run(&Self::args(input, output)).await?;

        if !result.success() {
            let stderr = result.stderr_text();
            tracing::warn!(status = ?result.status, stderr = %stderr, "FFmpeg fast-start rewrite failed");
            return Err(TranscodeError::Failed {
                status: result.status,
                stderr,
            });
        }

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Err(TranscodeError::MissingOutput(output.to_path_buf()));
        }

        tracing::debug!(
            output = %output.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Fast-start rewrite complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeMediaTool;

    #[test]
    fn test_output_path_appends_suffix() {
        assert_eq!(
            FastStartOptimizer::output_path(Path::new("/scratch/abc.mp4")),
            PathBuf::from("/scratch/abc.mp4.processed")
        );
    }

    #[test]
    fn test_args_copy_codecs_and_metadata() {
        let args = FastStartOptimizer::args(
            Path::new("/scratch/abc.mp4"),
            Path::new("/scratch/abc.mp4.processed"),
        );
        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "/scratch/abc.mp4",
                "-movflags",
                "faststart",
                "-map_metadata",
                "0",
                "-codec",
                "copy",
                "-f",
                "mp4",
                "/scratch/abc.mp4.processed"
            ]
        );
    }

    #[tokio::test]
    async fn test_optimize_writes_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("abc.mp4");
        tokio::fs::write(&input, b"raw").await.unwrap();

        let tool = Arc::new(FakeMediaTool::faststart_copy());
        let optimizer = FastStartOptimizer::new(tool.clone());

        let output = optimizer.optimize(&input).await.unwrap();
        assert_eq!(output, dir.path().join("abc.mp4.processed"));
        assert_eq!(tokio::fs::read(&output).await.unwrap(), b"raw");
        assert_eq!(tool.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_carries_diagnostics() {
        let tool = Arc::new(FakeMediaTool::failing("moov atom not found"));
        let optimizer = FastStartOptimizer::new(tool);

        let err = optimizer
            .optimize(Path::new("/scratch/abc.mp4"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("moov atom not found"));
    }

    #[tokio::test]
    async fn test_success_without_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = Arc::new(FakeMediaTool::succeeding(Vec::new()));
        let optimizer = FastStartOptimizer::new(tool);

        let result = optimizer.optimize(&dir.path().join("abc.mp4")).await;
        assert!(matches!(result, Err(TranscodeError::MissingOutput(_))));
    }
}
