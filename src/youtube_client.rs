// YouTube Data API v3 client for video uploads, playlist placement and custom thumbnails
// Docs: https://developers.google.com/youtube/v3

use async_trait::async_trait;
use reqwest::{Body, Client};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use tokio_util::io::ReaderStream;

use crate::error::{PipelineError, Result};
use crate::google_auth::AccessToken;
use crate::models::{DownloadedFile, VideoMetadata};

/// Thumbnails are always sent as JPEG
pub const THUMBNAIL_MIME_TYPE: &str = "image/jpeg";

/// Publishes videos and thumbnails to the channel behind the access token
#[async_trait]
pub trait VideoPublisher: Send + Sync {
    /// Upload the video, add it to the metadata's playlist if any, and return the new video id
    async fn upload_video(
        &self,
        token: &AccessToken,
        metadata: &VideoMetadata,
        file: &DownloadedFile,
    ) -> Result<String>;

    async fn upload_thumbnail(&self, token: &AccessToken, video_id: &str, thumbnail_path: &Path) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    api_base: String,
    upload_base: String,
}

// ============================================================================
// Video Upload Structures
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VideoSnippet {
    pub title: String,
    pub description: String,
    #[serde(rename = "categoryId")]
    pub category_id: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct VideoStatus {
    #[serde(rename = "privacyStatus")]
    pub privacy_status: String, // "public", "private", "unlisted"
}

#[derive(Debug, Serialize)]
pub struct VideoResource {
    pub snippet: VideoSnippet,
    pub status: VideoStatus,
}

impl From<&VideoMetadata> for VideoResource {
    fn from(metadata: &VideoMetadata) -> Self {
        Self {
            snippet: VideoSnippet {
                title: metadata.title.clone(),
                description: metadata.description.clone(),
                category_id: metadata.category_id.clone(),
                tags: metadata.tags.clone(),
            },
            status: VideoStatus {
                privacy_status: metadata.visibility.as_str().to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VideoUploadResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItemResponse {
    pub id: String,
}

// ============================================================================
// YouTube Client Implementation
// ============================================================================

impl YouTubeClient {
    pub fn new(client: Client, api_base: String, upload_base: String) -> Self {
        Self {
            client,
            api_base,
            upload_base,
        }
    }

    /// Open a resumable upload session and return its session URL
    ///
    /// Required scope: https://www.googleapis.com/auth/youtube.upload
    pub async fn initiate_resumable_upload(
        &self,
        token: &AccessToken,
        resource: &VideoResource,
        mime_type: &str,
        file_size: u64,
    ) -> Result<String> {
        let url = format!("{}/videos", self.upload_base);

        tracing::info!("🎬 Initiating resumable upload: {} ({} bytes)", resource.snippet.title, file_size);

        let response = self
            .client
            .post(&url)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .header("Authorization", token.bearer())
            .header("X-Upload-Content-Length", file_size.to_string())
            .header("X-Upload-Content-Type", mime_type)
            .json(resource)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = PipelineError::from_response("youtube", response).await;
            tracing::error!("❌ Failed to initiate resumable upload: {}", err);
            return Err(err);
        }

        // Extract the upload session URL from Location header
        let session_url = response
            .headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| PipelineError::Upstream {
                service: "youtube",
                status: response.status().as_u16(),
                message: "No upload session URL in response".to_string(),
            })?
            .to_string();

        Ok(session_url)
    }

    /// Stream the whole file into an upload session in one request
    pub async fn send_media(
        &self,
        session_url: &str,
        file_path: &Path,
        mime_type: &str,
        file_size: u64,
    ) -> Result<VideoUploadResponse> {
        let file = tokio::fs::File::open(file_path).await?;

        let response = self
            .client
            .put(session_url)
            .header("Content-Length", file_size.to_string())
            .header("Content-Type", mime_type)
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        if !response.status().is_success() {
            let err = PipelineError::from_response("youtube", response).await;
            tracing::error!("❌ YouTube upload failed: {}", err);
            return Err(err);
        }

        Ok(response.json().await?)
    }

    /// Add a video to a playlist
    pub async fn add_video_to_playlist(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<PlaylistItemResponse> {
        let url = format!("{}/playlistItems", self.api_base);

        let body = json!({
            "snippet": {
                "playlistId": playlist_id,
                "resourceId": {
                    "kind": "youtube#video",
                    "videoId": video_id,
                },
            },
        });

        let response = self
            .client
            .post(&url)
            .query(&[("part", "snippet")])
            .header("Authorization", token.bearer())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = PipelineError::from_response("youtube", response).await;
            tracing::error!("❌ Failed to add video {} to playlist {}: {}", video_id, playlist_id, err);
            return Err(err);
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl VideoPublisher for YouTubeClient {
    async fn upload_video(
        &self,
        token: &AccessToken,
        metadata: &VideoMetadata,
        file: &DownloadedFile,
    ) -> Result<String> {
        let file_size = tokio::fs::metadata(&file.file_path).await?.len();
        let resource = VideoResource::from(metadata);

        let session_url = self
            .initiate_resumable_upload(token, &resource, &file.mime_type, file_size)
            .await?;
        let uploaded = self
            .send_media(&session_url, &file.file_path, &file.mime_type, file_size)
            .await?;

        tracing::info!("✅ Video uploaded to YouTube: {} (ID: {})", metadata.title, uploaded.id);

        if let Some(playlist_id) = &metadata.playlist_id {
            self.add_video_to_playlist(token, playlist_id, &uploaded.id).await?;
            tracing::info!("📋 Video {} added to playlist {}", uploaded.id, playlist_id);
        }

        Ok(uploaded.id)
    }

    /// Required scope: https://www.googleapis.com/auth/youtube.upload
    async fn upload_thumbnail(&self, token: &AccessToken, video_id: &str, thumbnail_path: &Path) -> Result<()> {
        let url = format!("{}/thumbnails/set", self.upload_base);
        let file = tokio::fs::File::open(thumbnail_path).await?;
        let file_size = file.metadata().await?.len();

        tracing::info!("🖼️ Uploading custom thumbnail for video: {}", video_id);

        let response = self
            .client
            .post(&url)
            .query(&[("videoId", video_id), ("uploadType", "media")])
            .header("Authorization", token.bearer())
            .header("Content-Type", THUMBNAIL_MIME_TYPE)
            .header("Content-Length", file_size.to_string())
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        if !response.status().is_success() {
            let err = PipelineError::from_response("youtube", response).await;
            tracing::error!("❌ Failed to upload thumbnail for {}: {}", video_id, err);
            return Err(err);
        }

        tracing::info!("✅ Thumbnail uploaded for video: {}", video_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Visibility;

    #[test]
    fn test_video_resource_from_metadata() {
        let metadata = VideoMetadata {
            file_name: "a.mp4".to_string(),
            title: "T".to_string(),
            description: "D".to_string(),
            tags: vec!["x".to_string(), "y".to_string()],
            thumbnail: None,
            category_id: "22".to_string(),
            visibility: Visibility::Unlisted,
            playlist_id: None,
        };

        let value = serde_json::to_value(VideoResource::from(&metadata)).unwrap();
        assert_eq!(
            value,
            json!({
                "snippet": {"title": "T", "description": "D", "categoryId": "22", "tags": ["x", "y"]},
                "status": {"privacyStatus": "unlisted"}
            })
        );
    }
}
