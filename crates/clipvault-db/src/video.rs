use async_trait::async_trait;
use chrono::Utc;
use clipvault_core::{models::Video, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const VIDEO_COLUMNS: &str =
    "id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at";

/// Lookup and update of video records
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Insert a new record
    async fn create_video(&self, video: &Video) -> Result<Video, AppError>;

    /// Fetch a record by id
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// List a user's records, newest first
    async fn list_videos(&self, user_id: Uuid) -> Result<Vec<Video>, AppError>;

    /// Persist the mutable fields of `video`. Returns `NotFound` if the record is gone.
    async fn update_video(&self, video: &Video) -> Result<Video, AppError>;
}

/// Repository for video records backed by PostgreSQL
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert", db.record_id = %video.id))]
    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        let created = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            INSERT INTO videos (id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(video.id)
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.created_at)
        .bind(video.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {} FROM videos WHERE id = $1",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_videos(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let videos = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {} FROM videos WHERE user_id = $1 ORDER BY created_at DESC",
            VIDEO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", db.record_id = %video.id))]
    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        let updated = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            UPDATE videos
            SET title = $2, description = $3, thumbnail_url = $4, video_url = $5, updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Video {} not found", video.id)))
    }
}
