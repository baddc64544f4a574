#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use drive_publisher::clock::{self, FixedClock};
use drive_publisher::config::{DriveScope, FinishFolders, GoogleEndpoints, OAuthConfig};
use drive_publisher::drive_client::DriveStore;
use drive_publisher::google_auth::{AccessToken, CredentialProvider, GoogleAuth};
use drive_publisher::models::{DownloadedFile, DownloadedThumbnail, RelocatedFile, VideoMetadata, Visibility};
use drive_publisher::pipeline::UploadPipeline;
use drive_publisher::sheets_client::MetadataSource;
use drive_publisher::webhook_client::{WorkflowNotification, WorkflowNotifier};
use drive_publisher::youtube_client::VideoPublisher;
use drive_publisher::{AppState, PipelineError, Result};

pub const VIDEO_ID: &str = "VID123";

pub fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 9, 7, 55).unwrap())
}

pub fn folders() -> FinishFolders {
    FinishFolders {
        longform: "LONG_FOLDER".to_string(),
        shortform: "SHORT_FOLDER".to_string(),
    }
}

pub fn oauth_config() -> OAuthConfig {
    OAuthConfig {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        redirect_uri: "http://localhost:3000/oauth2callback".to_string(),
        drive_scope: DriveScope::Full,
    }
}

pub fn metadata(title: &str, thumbnail: Option<&str>) -> VideoMetadata {
    VideoMetadata {
        file_name: "a.mp4".to_string(),
        title: title.to_string(),
        description: "description".to_string(),
        tags: vec!["tag".to_string()],
        thumbnail: thumbnail.map(str::to_string),
        category_id: "22".to_string(),
        visibility: Visibility::Unlisted,
        playlist_id: None,
    }
}

/// In-memory stand-in for every Google collaborator, recording each call in order
#[derive(Default)]
pub struct FakeGoogle {
    pub metadata: Option<VideoMetadata>,
    /// Name of the operation that should fail: credentials, metadata, download,
    /// upload_video, download_thumbnail, upload_thumbnail, move
    pub fail_on: Option<&'static str>,
    pub webhook_fails: bool,
    pub calls: Mutex<Vec<String>>,
    pub notifications: Mutex<Vec<WorkflowNotification>>,
}

impl FakeGoogle {
    pub fn with_metadata(metadata: VideoMetadata) -> Self {
        Self {
            metadata: Some(metadata),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<WorkflowNotification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, op: &'static str, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail_on == Some(op) {
            return Err(PipelineError::Upstream {
                service: "fake",
                status: 500,
                message: format!("{} failed", op),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialProvider for FakeGoogle {
    async fn access_token(&self) -> Result<AccessToken> {
        self.record("credentials", "credentials".to_string())?;
        Ok(AccessToken::new("fake-token"))
    }
}

#[async_trait]
impl MetadataSource for FakeGoogle {
    async fn fetch_metadata(&self, file_name: &str, _token: &AccessToken) -> Result<VideoMetadata> {
        self.record("metadata", format!("metadata:{}", file_name))?;
        self.metadata
            .clone()
            .ok_or_else(|| PipelineError::NotFound(format!("No metadata row for {}", file_name)))
    }
}

#[async_trait]
impl DriveStore for FakeGoogle {
    async fn download_file(&self, file_id: &str, _token: &AccessToken) -> Result<DownloadedFile> {
        self.record("download", format!("download:{}", file_id))?;
        Ok(DownloadedFile {
            file_path: PathBuf::from("/tmp/a.mp4"),
            mime_type: "video/mp4".to_string(),
            original_name: "a.mp4".to_string(),
        })
    }

    async fn download_thumbnail(&self, file_id: &str, _token: &AccessToken) -> Result<DownloadedThumbnail> {
        self.record("download_thumbnail", format!("download_thumbnail:{}", file_id))?;
        let file_name = clock::thumbnail_file_name(&fixed_clock(), "cover.jpg");
        Ok(DownloadedThumbnail {
            file_id: file_id.to_string(),
            file_path: PathBuf::from("/tmp").join(&file_name),
            file_name,
        })
    }

    async fn move_to_finish_folder(
        &self,
        file_id: &str,
        is_long: bool,
        _token: &AccessToken,
    ) -> Result<RelocatedFile> {
        let folder_id = folders().for_kind(is_long).to_string();
        let new_name = clock::finished_file_name(&fixed_clock(), "a.mp4", is_long);
        self.record("move", format!("move:{}:{}:{}", file_id, folder_id, new_name))?;
        Ok(RelocatedFile {
            file_id: file_id.to_string(),
            folder_id,
            new_name,
        })
    }
}

#[async_trait]
impl VideoPublisher for FakeGoogle {
    async fn upload_video(
        &self,
        _token: &AccessToken,
        metadata: &VideoMetadata,
        _file: &DownloadedFile,
    ) -> Result<String> {
        self.record("upload_video", format!("upload_video:{}", metadata.title))?;
        Ok(VIDEO_ID.to_string())
    }

    async fn upload_thumbnail(&self, _token: &AccessToken, video_id: &str, thumbnail_path: &Path) -> Result<()> {
        self.record(
            "upload_thumbnail",
            format!("upload_thumbnail:{}:{}", video_id, thumbnail_path.display()),
        )
    }
}

#[async_trait]
impl WorkflowNotifier for FakeGoogle {
    async fn notify(&self, notification: &WorkflowNotification) -> Result<()> {
        self.notifications.lock().unwrap().push(notification.clone());
        if self.webhook_fails {
            return Err(PipelineError::Upstream {
                service: "workflow webhook",
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        Ok(())
    }
}

pub fn pipeline(fake: &Arc<FakeGoogle>, with_notifier: bool) -> UploadPipeline {
    let notifier: Option<Arc<dyn WorkflowNotifier>> = if with_notifier {
        Some(fake.clone())
    } else {
        None
    };
    UploadPipeline::new(fake.clone(), fake.clone(), fake.clone(), fake.clone(), notifier)
}

pub fn app_state(fake: &Arc<FakeGoogle>, token_path: PathBuf, endpoints: GoogleEndpoints) -> Arc<AppState> {
    Arc::new(AppState {
        auth: GoogleAuth::new(reqwest::Client::new(), oauth_config(), endpoints),
        token_path,
        pipeline: pipeline(fake, true),
    })
}
