use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A video record.
///
/// `video_url` holds the location of the uploaded asset: empty until the
/// first successful upload, then either a raw storage key (`wide/<token>.mp4`)
/// or a fully-qualified URL. Handlers replace a stored key with a freshly
/// signed URL before responding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn new(user_id: Uuid, title: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            description,
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Stored location, or `None` when nothing has been uploaded yet.
    pub fn location(&self) -> Option<&str> {
        self.video_url.as_deref().filter(|s| !s.is_empty())
    }
}

/// Request DTO for creating a draft video
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateVideoRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_video_has_no_location() {
        let video = Video::new(Uuid::new_v4(), "Boots".to_string(), String::new());
        assert_eq!(video.location(), None);
        assert_eq!(video.created_at, video.updated_at);
    }

    #[test]
    fn test_empty_location_is_none() {
        let mut video = Video::new(Uuid::new_v4(), "Boots".to_string(), String::new());
        video.video_url = Some(String::new());
        assert_eq!(video.location(), None);
        video.video_url = Some("wide/abc.mp4".to_string());
        assert_eq!(video.location(), Some("wide/abc.mp4"));
    }

    #[test]
    fn test_ownership() {
        let owner = Uuid::new_v4();
        let video = Video::new(owner, "Boots".to_string(), String::new());
        assert!(video.is_owned_by(owner));
        assert!(!video.is_owned_by(Uuid::new_v4()));
    }

    #[test]
    fn test_create_request_validation() {
        let ok = CreateVideoRequest {
            title: "Boots".to_string(),
            description: String::new(),
        };
        assert!(ok.validate().is_ok());

        let empty = CreateVideoRequest {
            title: String::new(),
            description: String::new(),
        };
        assert!(empty.validate().is_err());
    }
}
