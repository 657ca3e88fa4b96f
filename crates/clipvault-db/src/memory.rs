use crate::video::VideoRepository;
use async_trait::async_trait;
use chrono::Utc;
use clipvault_core::{models::Video, AppError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Video records held in process memory.
///
/// Used when no `DATABASE_URL` is configured and by tests.
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<RwLock<HashMap<Uuid, Video>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&video.id) {
            return Err(AppError::BadRequest(format!(
                "Video {} already exists",
                video.id
            )));
        }
        videos.insert(video.id, video.clone());
        Ok(video.clone())
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn list_videos(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let mut videos: Vec<Video> = self
            .videos
            .read()
            .await
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        let mut videos = self.videos.write().await;
        let stored = videos
            .get_mut(&video.id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video.id)))?;

        stored.title = video.title.clone();
        stored.description = video.description.clone();
        stored.thumbnail_url = video.thumbnail_url.clone();
        stored.video_url = video.video_url.clone();
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }
}
