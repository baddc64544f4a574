// Outbound notifications to the external automation workflow

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifiedFileType {
    Video,
    Thumbnail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNotification {
    pub file_type: NotifiedFileType,
    pub file_id: String,
    pub file_name: String,
}

#[async_trait]
pub trait WorkflowNotifier: Send + Sync {
    async fn notify(&self, notification: &WorkflowNotification) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
    url: String,
}

impl WebhookClient {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl WorkflowNotifier for WebhookClient {
    async fn notify(&self, notification: &WorkflowNotification) -> Result<()> {
        let response = self.client.post(&self.url).json(notification).send().await?;

        if !response.status().is_success() {
            return Err(PipelineError::from_response("workflow webhook", response).await);
        }

        tracing::info!(
            "📨 Workflow notified: {:?} {} ({})",
            notification.file_type,
            notification.file_name,
            notification.file_id
        );
        Ok(())
    }
}
