// lib.rs - Drive → YouTube publishing webhook service
pub mod clock;
pub mod config;
pub mod drive_client;
pub mod error;
pub mod google_auth;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod sheets_client;
pub mod webhook_client;
pub mod youtube_client;

use axum::{Extension, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::drive_client::DriveClient;
use crate::google_auth::GoogleAuth;
use crate::pipeline::UploadPipeline;
use crate::sheets_client::SheetsClient;
use crate::webhook_client::{WebhookClient, WorkflowNotifier};
use crate::youtube_client::YouTubeClient;

pub use error::{PipelineError, Result};

// AppState holds the OAuth client, where consented tokens are written, and the upload pipeline
pub struct AppState {
    pub auth: GoogleAuth,
    pub token_path: PathBuf,
    pub pipeline: UploadPipeline,
}

impl AppState {
    /// Wire the reqwest-backed Google clients from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let http = reqwest::Client::new();
        let endpoints = &config.endpoints;

        let auth = GoogleAuth::new(http.clone(), config.oauth.clone(), endpoints.clone());
        let credentials = google_auth::credential_provider(auth.clone(), &config.credential_source);

        let sheets = SheetsClient::new(http.clone(), endpoints.sheets_api.clone(), config.sheet.clone());
        let drive = DriveClient::new(
            http.clone(),
            endpoints.drive_api.clone(),
            config.download_dir.clone(),
            config.folders.clone(),
            clock,
        );
        let youtube = YouTubeClient::new(
            http.clone(),
            endpoints.youtube_api.clone(),
            endpoints.youtube_upload_api.clone(),
        );

        let notifier = match &config.workflow_webhook_url {
            Some(url) => {
                tracing::info!("📨 Workflow webhook notifications enabled");
                Some(Arc::new(WebhookClient::new(http.clone(), url.clone())) as Arc<dyn WorkflowNotifier>)
            }
            None => {
                tracing::info!("Workflow webhook not configured; notifications disabled");
                None
            }
        };

        let pipeline = UploadPipeline::new(
            credentials,
            Arc::new(sheets),
            Arc::new(drive),
            Arc::new(youtube),
            notifier,
        );

        Self {
            auth,
            token_path: config.token_path.clone(),
            pipeline,
        }
    }
}

/// Build the application with all routes and shared state
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(handlers::health::health_routes())
        .merge(handlers::oauth::oauth_routes())
        .merge(handlers::upload::upload_routes())
        .layer(axum::middleware::from_fn(middleware::logging::request_logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}
