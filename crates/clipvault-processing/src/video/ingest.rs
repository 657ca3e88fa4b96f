//! Video ingest pipeline.
//!
//! Takes a validated upload from raw bytes to a fast-start object in storage
//! with its location recorded on the video:
//!
//! ```text
//! Validating -> PersistingScratch -> Optimizing -> Probing -> Classifying
//!   -> Uploading -> RecordingMetadata -> CleaningUp -> Done
//! ```
//!
//! Any failure aborts the run. Scratch files are [`ScratchFile`] guards, so
//! they are removed on every exit path including cancellation.

use super::aspect::AspectCategory;
use super::faststart::{FastStartOptimizer, TranscodeError};
use super::media_tool::MediaTool;
use super::probe::{GeometryProbe, ProbeError};
use crate::scratch::ScratchFile;
use bytes::Bytes;
use clipvault_core::models::Video;
use clipvault_core::{AppError, LocationMode, VideoConfig};
use clipvault_db::VideoRepository;
use clipvault_storage::{ObjectKey, RandomToken, Storage, StorageError};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

/// Settings the pipeline needs, taken from [`VideoConfig`]
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub scratch_dir: PathBuf,
    pub max_video_size_bytes: u64,
    /// Lowercase MIME types without parameters.
    pub allowed_content_types: Vec<String>,
    pub signed_url_ttl: Duration,
    pub location_mode: LocationMode,
}

impl IngestConfig {
    pub fn from_video_config(config: &VideoConfig) -> Self {
        Self {
            scratch_dir: config.scratch_dir.clone(),
            max_video_size_bytes: config.max_video_size_bytes,
            allowed_content_types: config.allowed_content_types.clone(),
            signed_url_ttl: config.signed_url_ttl,
            location_mode: config.location_mode,
        }
    }
}

/// An uploaded video body with its declared content type
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub data: Bytes,
    pub content_type: String,
}

impl VideoUpload {
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Content type without parameters, lowercased.
    pub fn mime_type(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Validating,
    PersistingScratch,
    Optimizing,
    Probing,
    Classifying,
    Uploading,
    RecordingMetadata,
    CleaningUp,
    Done,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStage::Validating => "validating",
            IngestStage::PersistingScratch => "persisting_scratch",
            IngestStage::Optimizing => "optimizing",
            IngestStage::Probing => "probing",
            IngestStage::Classifying => "classifying",
            IngestStage::Uploading => "uploading",
            IngestStage::RecordingMetadata => "recording_metadata",
            IngestStage::CleaningUp => "cleaning_up",
            IngestStage::Done => "done",
        }
    }
}

impl Display for IngestStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Video {0} not found")]
    VideoNotFound(Uuid),

    #[error("User is not the owner of video {0}")]
    NotOwner(Uuid),

    #[error("Missing Content-Type for video")]
    MissingContentType,

    #[error("Video file is too large: {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },

    #[error("Invalid file type {content_type}. Allowed types: {}", .allowed.join(", "))]
    UnsupportedContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Failed to write scratch file: {0}")]
    Scratch(#[source] std::io::Error),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Failed to upload {key}: {source}")]
    Upload {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to sign {key}: {source}")]
    Sign {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to record video location: {0}")]
    Metadata(#[source] AppError),
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::VideoNotFound(_) => AppError::NotFound("Couldn't find video".to_string()),
            IngestError::NotOwner(_) => {
                AppError::Forbidden("User is not the owner of this video".to_string())
            }
            IngestError::MissingContentType => {
                AppError::BadRequest("Missing Content-Type for video".to_string())
            }
            e @ IngestError::TooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
            e @ IngestError::UnsupportedContentType { .. } => AppError::InvalidInput(e.to_string()),
            e @ IngestError::Scratch(_) => AppError::Internal(e.to_string()),
            e @ (IngestError::Transcode(_) | IngestError::Probe(_)) => {
                AppError::ExternalTool(e.to_string())
            }
            e @ (IngestError::Upload { .. } | IngestError::Sign { .. }) => {
                AppError::Storage(e.to_string())
            }
            IngestError::Metadata(e) => e,
        }
    }
}

/// Runs uploads through fast-start, classification, storage and the record update.
#[derive(Clone)]
pub struct VideoIngestPipeline {
    optimizer: FastStartOptimizer,
    probe: GeometryProbe,
    storage: Arc<dyn Storage>,
    videos: Arc<dyn VideoRepository>,
    config: IngestConfig,
}

impl VideoIngestPipeline {
    pub fn new(
        optimizer: FastStartOptimizer,
        probe: GeometryProbe,
        storage: Arc<dyn Storage>,
        videos: Arc<dyn VideoRepository>,
        config: IngestConfig,
    ) -> Self {
        Self {
            optimizer,
            probe,
            storage,
            videos,
            config,
        }
    }

    pub fn from_tools(
        ffmpeg: Arc<dyn MediaTool>,
        ffprobe: Arc<dyn MediaTool>,
        storage: Arc<dyn Storage>,
        videos: Arc<dyn VideoRepository>,
        config: IngestConfig,
    ) -> Self {
        Self::new(
            FastStartOptimizer::new(ffmpeg),
            GeometryProbe::new(ffprobe),
            storage,
            videos,
            config,
        )
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Load the video and check `user_id` owns it.
    pub async fn authorize(&self, video_id: Uuid, user_id: Uuid) -> Result<Video, IngestError> {
        let video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(IngestError::Metadata)?
            .ok_or(IngestError::VideoNotFound(video_id))?;

        if !video.is_owned_by(user_id) {
            return Err(IngestError::NotOwner(video_id));
        }
        Ok(video)
    }

    /// Check size and content type. Returns the file extension for the upload.
    ///
    /// Touches neither disk nor tools.
    pub fn validate(&self, upload: &VideoUpload) -> Result<String, IngestError> {
        if upload.size() > self.config.max_video_size_bytes {
            return Err(IngestError::TooLarge {
                size: upload.size(),
                max: self.config.max_video_size_bytes,
            });
        }

        let mime_type = upload.mime_type();
        if mime_type.is_empty() {
            return Err(IngestError::MissingContentType);
        }

        if !self.config.allowed_content_types.contains(&mime_type) {
            return Err(IngestError::UnsupportedContentType {
                content_type: mime_type,
                allowed: self.config.allowed_content_types.clone(),
            });
        }

        // "video/mp4" -> "mp4"
        let extension = mime_type
            .split_once('/')
            .map(|(_, subtype)| subtype)
            .unwrap_or(&mime_type);
        Ok(extension.to_string())
    }

    /// Authorize `user_id` against `video_id`, then ingest.
    pub async fn run(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        upload: VideoUpload,
    ) -> Result<Video, IngestError> {
        let video = self.authorize(video_id, user_id).await?;
        self.ingest(video, upload).await
    }

    /// Ingest `upload` as the asset of `video`, which the caller has already
    /// authorized. Returns the updated video with a signed location.
    #[tracing::instrument(skip(self, video, upload), fields(
        video.id = %video.id,
        user.id = %video.user_id,
        upload.size = upload.size(),
        upload.content_type = %upload.content_type
    ))]
    pub async fn ingest(&self, video: Video, upload: VideoUpload) -> Result<Video, IngestError> {
        let start = Instant::now();
        let mut stage = IngestStage::Validating;

        match self.execute(video, upload, &mut stage).await {
            Ok(video) => {
                tracing::info!(
                    video_url = video.video_url.as_deref().unwrap_or(""),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Video ingested"
                );
                self.sign_video(video).await
            }
            Err(e) => {
                tracing::warn!(
                    stage = %stage,
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Video ingest aborted"
                );
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        mut video: Video,
        upload: VideoUpload,
        stage: &mut IngestStage,
    ) -> Result<Video, IngestError> {
        let extension = self.validate(&upload)?;
        let mime_type = upload.mime_type();

        *stage = IngestStage::PersistingScratch;
        tokio::fs::create_dir_all(&self.config.scratch_dir)
            .await
            .map_err(IngestError::Scratch)?;

        // One token names both the scratch file and the stored object.
        let token = RandomToken::generate();
        let raw = ScratchFile::create(
            &self.config.scratch_dir,
            &format!("{}.{}", token, extension),
            &upload.data,
        )
        .await
        .map_err(IngestError::Scratch)?;
        drop(upload);

        *stage = IngestStage::Optimizing;
        // Registered before ffmpeg runs so a partial output is removed too.
        let processed = ScratchFile::adopt(FastStartOptimizer::output_path(raw.path()));
        self.optimizer.rewrite(raw.path(), processed.path()).await?;
        drop(raw);

        *stage = IngestStage::Probing;
        let geometry = self.probe.probe(processed.path()).await?;

        *stage = IngestStage::Classifying;
        let category = AspectCategory::classify(geometry.width, geometry.height);
        tracing::debug!(
            width = geometry.width,
            height = geometry.height,
            category = %category,
            "Classified video"
        );

        *stage = IngestStage::Uploading;
        let key = ObjectKey::with_token(category, &token, &extension);
        let object_url = self
            .storage
            .put_file(key.as_str(), processed.path(), &mime_type)
            .await
            .map_err(|source| IngestError::Upload {
                key: key.to_string(),
                source,
            })?;

        *stage = IngestStage::RecordingMetadata;
        video.video_url = Some(match self.config.location_mode {
            LocationMode::Key => key.into_string(),
            LocationMode::Url => object_url,
        });
        // The object stays in storage if this fails.
        let video = self
            .videos
            .update_video(&video)
            .await
            .map_err(IngestError::Metadata)?;

        *stage = IngestStage::CleaningUp;
        drop(processed);

        *stage = IngestStage::Done;
        Ok(video)
    }

    /// Replace a stored object key with a signed, time-limited URL.
    ///
    /// Videos without a location, or whose location is already a URL, are
    /// returned unchanged.
    pub async fn sign_video(&self, mut video: Video) -> Result<Video, IngestError> {
        let Some(key) = video.location() else {
            return Ok(video);
        };
        if is_absolute_url(key) {
            return Ok(video);
        }

        let key = key.to_string();
        let signed = self
            .storage
            .get_presigned_url(&key, self.config.signed_url_ttl)
            .await
            .map_err(|source| IngestError::Sign {
                key: key.clone(),
                source,
            })?;
        video.video_url = Some(signed);
        Ok(video)
    }
}

fn is_absolute_url(location: &str) -> bool {
    location.starts_with("https://") || location.starts_with("http://")
}
