//! Stream geometry via ffprobe.

use super::media_tool::{MediaTool, ToolError};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Width and height of the primary video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamGeometry {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("ffprobe failed: {stderr}")]
    Failed { status: Option<i32>, stderr: String },

    #[error("No video stream found")]
    NoVideoStream,

    #[error("Invalid video dimensions {width:?}x{height:?}")]
    InvalidDimensions {
        width: Option<u32>,
        height: Option<u32>,
    },

    #[error("Failed to parse ffprobe output: {0}")]
    Parse(String),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Reads the width and height of a file's first video stream
#[derive(Clone)]
pub struct GeometryProbe {
    tool: Arc<dyn MediaTool>,
}

impl GeometryProbe {
    pub fn new(tool: Arc<dyn MediaTool>) -> Self {
        Self { tool }
    }

    /// Arguments asking only for the first video stream's dimensions, as JSON.
    pub fn args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            "-show_entries".to_string(),
            "stream=width,height".to_string(),
            "-of".to_string(),
            "json".to_string(),
            path.to_string_lossy().into_owned(),
        ]
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = %self.tool.program(),
        ffmpeg.operation = "probe",
        path = %path.display()
    ))]
    pub async fn probe(&self, path: &Path) -> Result<StreamGeometry, ProbeError> {
        let output = self.tool.run(&Self::args(path)).await?;

        if !output.success() {
            return Err(ProbeError::Failed {
                status: output.status,
                stderr: output.stderr_text(),
            });
        }

        let geometry = parse_geometry(&output.stdout)?;
        tracing::debug!(
            width = geometry.width,
            height = geometry.height,
            "Probed stream geometry"
        );
        Ok(geometry)
    }
}

/// Parse `ffprobe -show_entries stream=width,height -of json` output.
pub fn parse_geometry(stdout: &[u8]) -> Result<StreamGeometry, ProbeError> {
    let parsed: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|e| ProbeError::Parse(e.to_string()))?;

    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or(ProbeError::NoVideoStream)?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => {
            Ok(StreamGeometry { width, height })
        }
        (width, height) => Err(ProbeError::InvalidDimensions { width, height }),
    }
}
