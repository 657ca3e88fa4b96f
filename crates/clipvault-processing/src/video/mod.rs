//! Video ingestion

pub mod aspect;
pub mod faststart;
pub mod ingest;
pub mod media_tool;
pub mod probe;

pub use aspect::AspectCategory;
pub use faststart::{FastStartOptimizer, TranscodeError};
pub use ingest::{IngestConfig, IngestError, IngestStage, VideoIngestPipeline, VideoUpload};
pub use media_tool::{CommandTool, MediaTool, ToolError, ToolOutput};
pub use probe::{GeometryProbe, ProbeError, StreamGeometry};
