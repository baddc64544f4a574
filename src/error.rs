// Error taxonomy shared by the Google clients, the pipeline and the HTTP handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Caller-supplied input is missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// No spreadsheet row (or sheet data) for the requested file
    #[error("Not found: {0}")]
    NotFound(String),

    /// A Google API or the workflow webhook answered with a non-success status
    #[error("{service} request failed ({status}): {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Builds an `Upstream` error from a response that already failed its status check.
    pub async fn from_response(service: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let message = match response.text().await {
            Ok(text) => text,
            Err(e) => format!("<unreadable body: {}>", e),
        };
        PipelineError::Upstream {
            service,
            status,
            message,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the log
        let message = match &self {
            PipelineError::Validation(msg) => msg.clone(),
            _ => "Upload failed".to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
