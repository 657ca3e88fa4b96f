//! Clipvault Processing Library
//!
//! Video ingestion: external media tools (ffprobe, ffmpeg), orientation
//! classification, scratch-file management and the ingest pipeline that ties
//! them to storage and the video repository.

pub mod scratch;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod video;

pub use scratch::ScratchFile;
pub use video::{
    AspectCategory, CommandTool, FastStartOptimizer, GeometryProbe, IngestConfig, IngestError,
    IngestStage, MediaTool, ProbeError, StreamGeometry, ToolError, ToolOutput, TranscodeError,
    VideoIngestPipeline, VideoUpload,
};
