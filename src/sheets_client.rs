// Google Sheets API v4 client for the publishing metadata sheet
// Docs: https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values/get

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::SheetConfig;
use crate::error::{PipelineError, Result};
use crate::google_auth::AccessToken;
use crate::models::VideoMetadata;

/// Looks up the metadata row for a media file
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_metadata(&self, file_name: &str, token: &AccessToken) -> Result<VideoMetadata>;
}

#[derive(Debug, Deserialize)]
pub struct ValueRange {
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    api_base: String,
    sheet: SheetConfig,
}

impl SheetsClient {
    pub fn new(client: Client, api_base: String, sheet: SheetConfig) -> Self {
        Self {
            client,
            api_base,
            sheet,
        }
    }

    /// Read all cells of the configured range
    pub async fn get_values(&self, token: &AccessToken) -> Result<ValueRange> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.api_base,
            urlencoding::encode(&self.sheet.spreadsheet_id),
            urlencoding::encode(&self.sheet.range)
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", token.bearer())
            .send()
            .await?;

        if !response.status().is_success() {
            let err = PipelineError::from_response("sheets", response).await;
            tracing::error!("❌ Sheets API error: {}", err);
            return Err(err);
        }

        Ok(response.json().await?)
    }

    /// First row whose column A matches `file_name` under the configured match rules
    pub fn find_row<'a>(&self, rows: &'a [Vec<String>], file_name: &str) -> Option<&'a Vec<String>> {
        rows.iter().find(|row| {
            row.first()
                .map(|cell| self.sheet.match_options.matches(cell, file_name))
                .unwrap_or(false)
        })
    }
}

#[async_trait]
impl MetadataSource for SheetsClient {
    async fn fetch_metadata(&self, file_name: &str, token: &AccessToken) -> Result<VideoMetadata> {
        let value_range = self.get_values(token).await?;

        if value_range.values.is_empty() {
            tracing::warn!("❌ Sheet range {} has no data", self.sheet.range);
            return Err(PipelineError::NotFound(format!(
                "Sheet range {} is empty",
                self.sheet.range
            )));
        }

        let row = self.find_row(&value_range.values, file_name).ok_or_else(|| {
            tracing::warn!("❌ No metadata row for file: {}", file_name);
            PipelineError::NotFound(format!("No metadata row for {}", file_name))
        })?;

        let metadata = VideoMetadata::from_row(row, &self.sheet.defaults);
        tracing::info!("📋 Metadata found for {}: {}", file_name, metadata.title);
        Ok(metadata)
    }
}
