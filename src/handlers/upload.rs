// Webhook entry point that runs the upload pipeline for one Drive file

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use std::sync::Arc;

use crate::error::PipelineError;
use crate::models::{UploadRequest, UploadResponse};
use crate::AppState;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "업로드 성공";

pub fn upload_routes() -> Router {
    Router::new().route("/upload", post(upload_webhook))
}

pub async fn upload_webhook(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return PipelineError::Validation(format!("Invalid request body: {}", rejection.body_text()))
                .into_response();
        }
    };

    tracing::info!("📨 Upload webhook received: {:?}", request);

    let job = match request.validate() {
        Ok(job) => job,
        Err(e) => return e.into_response(),
    };

    match state.pipeline.run(&job).await {
        Ok(success) => {
            tracing::debug!(report = ?success.report, "pipeline report");
            Json(UploadResponse {
                message: UPLOAD_SUCCESS_MESSAGE.to_string(),
                video_id: success.video_id,
            })
            .into_response()
        }
        Err(failure) => {
            tracing::error!(
                stage = %failure.stage,
                report = ?failure.report,
                "❌ Upload pipeline failed for {}",
                job.file_name
            );
            failure.error.into_response()
        }
    }
}
