use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Body of `POST /upload`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_name: Option<String>,
    pub file_id: Option<String>,
    #[serde(default)]
    pub is_long: Option<bool>,
}

/// An upload request whose required fields are present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    pub file_name: String,
    pub file_id: String,
    pub is_long: bool,
}

impl UploadRequest {
    pub fn validate(self) -> Result<UploadJob> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        match (present(self.file_name), present(self.file_id)) {
            (Some(file_name), Some(file_id)) => Ok(UploadJob {
                file_name,
                file_id,
                is_long: self.is_long.unwrap_or(false),
            }),
            _ => Err(PipelineError::Validation(
                "fileName and fileId are required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub video_id: String,
}
