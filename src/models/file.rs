use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Media file streamed from Drive into the download directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedFile {
    pub file_path: PathBuf,
    pub mime_type: String,
    pub original_name: String,
}

/// Thumbnail streamed from Drive, stored under a generated name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedThumbnail {
    pub file_id: String,
    pub file_path: PathBuf,
    pub file_name: String,
}

/// Result of moving a source file into its finish folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocatedFile {
    pub file_id: String,
    pub folder_id: String,
    pub new_name: String,
}
