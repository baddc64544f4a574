// Google Drive API v3 client: media downloads and finish-folder relocation
// Docs: https://developers.google.com/drive/api/reference/rest/v3/files

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::clock::{self, Clock};
use crate::config::FinishFolders;
use crate::error::{PipelineError, Result};
use crate::google_auth::AccessToken;
use crate::models::{DownloadedFile, DownloadedThumbnail, RelocatedFile};

/// Drive operations used by the upload pipeline
#[async_trait]
pub trait DriveStore: Send + Sync {
    async fn download_file(&self, file_id: &str, token: &AccessToken) -> Result<DownloadedFile>;

    async fn download_thumbnail(&self, file_id: &str, token: &AccessToken) -> Result<DownloadedThumbnail>;

    async fn move_to_finish_folder(
        &self,
        file_id: &str,
        is_long: bool,
        token: &AccessToken,
    ) -> Result<RelocatedFile>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: Option<String>,
    pub name: String,
    pub mime_type: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
}

pub struct DriveClient {
    client: Client,
    api_base: String,
    download_dir: PathBuf,
    folders: FinishFolders,
    clock: Arc<dyn Clock>,
}

impl DriveClient {
    pub fn new(
        client: Client,
        api_base: String,
        download_dir: PathBuf,
        folders: FinishFolders,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            api_base,
            download_dir,
            folders,
            clock,
        }
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.api_base, urlencoding::encode(file_id))
    }

    /// Fetch selected metadata fields of a file
    pub async fn get_file(&self, file_id: &str, fields: &str, token: &AccessToken) -> Result<DriveFile> {
        let response = self
            .client
            .get(self.file_url(file_id))
            .query(&[("fields", fields), ("supportsAllDrives", "true")])
            .header("Authorization", token.bearer())
            .send()
            .await?;

        if !response.status().is_success() {
            let err = PipelineError::from_response("drive", response).await;
            tracing::error!("❌ Failed to read Drive file {}: {}", file_id, err);
            return Err(err);
        }

        Ok(response.json().await?)
    }

    /// Stream the binary content of a file to `dest`, returning the byte count.
    /// Resolves only after the last chunk has been written and flushed.
    pub async fn stream_to_file(&self, file_id: &str, dest: &Path, token: &AccessToken) -> Result<u64> {
        let response = self
            .client
            .get(self.file_url(file_id))
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .header("Authorization", token.bearer())
            .send()
            .await?;

        if !response.status().is_success() {
            let err = PipelineError::from_response("drive", response).await;
            tracing::error!("❌ Failed to download Drive file {}: {}", file_id, err);
            return Err(err);
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }

    /// New uuid-named directory under the download dir, one per download
    async fn scratch_dir(&self) -> Result<PathBuf> {
        let dir = self.download_dir.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }
}

/// Local path for a Drive file name, with any directory components dropped
fn local_path(dir: &Path, name: &str) -> PathBuf {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "download".into());
    dir.join(base)
}

#[async_trait]
impl DriveStore for DriveClient {
    async fn download_file(&self, file_id: &str, token: &AccessToken) -> Result<DownloadedFile> {
        let metadata = self.get_file(file_id, "name, mimeType", token).await?;
        let mime_type = metadata
            .mime_type
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let file_path = local_path(&self.scratch_dir().await?, &metadata.name);
        let bytes = self.stream_to_file(file_id, &file_path, token).await?;

        tracing::info!("📥 File downloaded: {} ({} bytes)", file_path.display(), bytes);

        Ok(DownloadedFile {
            file_path,
            mime_type,
            original_name: metadata.name,
        })
    }

    async fn download_thumbnail(&self, file_id: &str, token: &AccessToken) -> Result<DownloadedThumbnail> {
        let metadata = self.get_file(file_id, "name", token).await?;
        let file_name = clock::thumbnail_file_name(self.clock.as_ref(), &metadata.name);

        let file_path = self.scratch_dir().await?.join(&file_name);
        let bytes = self.stream_to_file(file_id, &file_path, token).await?;

        tracing::info!("🖼️ Thumbnail downloaded: {} ({} bytes)", file_path.display(), bytes);

        Ok(DownloadedThumbnail {
            file_id: file_id.to_string(),
            file_path,
            file_name,
        })
    }

    async fn move_to_finish_folder(
        &self,
        file_id: &str,
        is_long: bool,
        token: &AccessToken,
    ) -> Result<RelocatedFile> {
        let folder_id = self.folders.for_kind(is_long).to_string();
        let current = self.get_file(file_id, "parents, name", token).await?;
        let new_name = clock::finished_file_name(self.clock.as_ref(), &current.name, is_long);
        let previous_parents = current.parents.join(",");

        let mut query = vec![
            ("addParents", folder_id.as_str()),
            ("fields", "id, name, parents"),
            ("supportsAllDrives", "true"),
        ];
        if !previous_parents.is_empty() {
            query.push(("removeParents", previous_parents.as_str()));
        }

        // Parent swap and rename go out as one metadata update
        let response = self
            .client
            .patch(self.file_url(file_id))
            .query(&query)
            .header("Authorization", token.bearer())
            .json(&json!({ "name": new_name }))
            .send()
            .await?;

        if !response.status().is_success() {
            let err = PipelineError::from_response("drive", response).await;
            tracing::error!("❌ Failed to move Drive file {}: {}", file_id, err);
            return Err(err);
        }

        tracing::info!("📁 Moved {} to folder {} as {}", file_id, folder_id, new_name);

        Ok(RelocatedFile {
            file_id: file_id.to_string(),
            folder_id,
            new_name,
        })
    }
}
