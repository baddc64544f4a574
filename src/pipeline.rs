//! Upload pipeline for one webhook request.
//!
//! Stages run strictly in order, each awaited before the next starts:
//! authenticate → lookup_metadata → download_video → upload_video →
//! download_thumbnail → upload_thumbnail → relocate_file → notify_workflow.
//! The first failing stage ends the run. Thumbnail stages are skipped when the
//! metadata row names no thumbnail; a failed workflow notification is recorded
//! but never fails the run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::drive_client::DriveStore;
use crate::error::{PipelineError, Result};
use crate::google_auth::CredentialProvider;
use crate::models::{DownloadedThumbnail, RelocatedFile, UploadJob};
use crate::sheets_client::MetadataSource;
use crate::webhook_client::{NotifiedFileType, WorkflowNotification, WorkflowNotifier};
use crate::youtube_client::VideoPublisher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Authenticate,
    LookupMetadata,
    DownloadVideo,
    UploadVideo,
    DownloadThumbnail,
    UploadThumbnail,
    RelocateFile,
    NotifyWorkflow,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Authenticate => "authenticate",
            Stage::LookupMetadata => "lookup_metadata",
            Stage::DownloadVideo => "download_video",
            Stage::UploadVideo => "upload_video",
            Stage::DownloadThumbnail => "download_thumbnail",
            Stage::UploadThumbnail => "upload_thumbnail",
            Stage::RelocateFile => "relocate_file",
            Stage::NotifyWorkflow => "notify_workflow",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StageStatus {
    Succeeded,
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: Stage,
    #[serde(flatten)]
    pub status: StageStatus,
}

/// Per-stage outcomes in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub stages: Vec<StageOutcome>,
}

impl PipelineReport {
    fn record(&mut self, stage: Stage, status: StageStatus) {
        self.stages.push(StageOutcome { stage, status });
    }

    fn skip(&mut self, stage: Stage, reason: &str) {
        tracing::info!(stage = %stage, "⏭️ {}", reason);
        self.record(
            stage,
            StageStatus::Skipped {
                reason: reason.to_string(),
            },
        );
    }

    pub fn status_of(&self, stage: Stage) -> Option<&StageStatus> {
        self.stages
            .iter()
            .rev()
            .find(|outcome| outcome.stage == stage)
            .map(|outcome| &outcome.status)
    }
}

#[derive(Debug)]
pub struct PipelineSuccess {
    pub video_id: String,
    pub relocated: RelocatedFile,
    pub report: PipelineReport,
}

#[derive(Debug)]
pub struct PipelineFailure {
    pub stage: Stage,
    pub error: PipelineError,
    pub report: PipelineReport,
}

type StageResult<T> = std::result::Result<T, (Stage, PipelineError)>;

pub struct UploadPipeline {
    credentials: Arc<dyn CredentialProvider>,
    metadata: Arc<dyn MetadataSource>,
    drive: Arc<dyn DriveStore>,
    publisher: Arc<dyn VideoPublisher>,
    notifier: Option<Arc<dyn WorkflowNotifier>>,
}

impl UploadPipeline {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        metadata: Arc<dyn MetadataSource>,
        drive: Arc<dyn DriveStore>,
        publisher: Arc<dyn VideoPublisher>,
        notifier: Option<Arc<dyn WorkflowNotifier>>,
    ) -> Self {
        Self {
            credentials,
            metadata,
            drive,
            publisher,
            notifier,
        }
    }

    pub async fn run(&self, job: &UploadJob) -> std::result::Result<PipelineSuccess, PipelineFailure> {
        let mut report = PipelineReport::default();

        tracing::info!(
            file_name = %job.file_name,
            file_id = %job.file_id,
            is_long = job.is_long,
            "🚀 Upload pipeline started"
        );

        match self.execute(job, &mut report).await {
            Ok((video_id, relocated)) => {
                tracing::info!(video_id = %video_id, "✅ Upload pipeline completed");
                Ok(PipelineSuccess {
                    video_id,
                    relocated,
                    report,
                })
            }
            Err((stage, error)) => Err(PipelineFailure { stage, error, report }),
        }
    }

    async fn execute(&self, job: &UploadJob, report: &mut PipelineReport) -> StageResult<(String, RelocatedFile)> {
        let token = track(report, Stage::Authenticate, self.credentials.access_token()).await?;

        let metadata = track(
            report,
            Stage::LookupMetadata,
            self.metadata.fetch_metadata(&job.file_name, &token),
        )
        .await?;

        let video = track(report, Stage::DownloadVideo, self.drive.download_file(&job.file_id, &token)).await?;

        let video_id = track(
            report,
            Stage::UploadVideo,
            self.publisher.upload_video(&token, &metadata, &video),
        )
        .await?;

        let thumbnail = match &metadata.thumbnail {
            Some(thumbnail_id) => {
                let thumbnail = track(
                    report,
                    Stage::DownloadThumbnail,
                    self.drive.download_thumbnail(thumbnail_id, &token),
                )
                .await?;
                track(
                    report,
                    Stage::UploadThumbnail,
                    self.publisher.upload_thumbnail(&token, &video_id, &thumbnail.file_path),
                )
                .await?;
                Some(thumbnail)
            }
            None => {
                report.skip(Stage::DownloadThumbnail, "metadata names no thumbnail");
                report.skip(Stage::UploadThumbnail, "metadata names no thumbnail");
                None
            }
        };

        let relocated = track(
            report,
            Stage::RelocateFile,
            self.drive.move_to_finish_folder(&job.file_id, job.is_long, &token),
        )
        .await?;

        self.notify_workflow(job, &relocated, thumbnail.as_ref(), report).await;

        Ok((video_id, relocated))
    }

    /// Best effort: failures are logged and recorded, never propagated
    async fn notify_workflow(
        &self,
        job: &UploadJob,
        relocated: &RelocatedFile,
        thumbnail: Option<&DownloadedThumbnail>,
        report: &mut PipelineReport,
    ) {
        let Some(notifier) = &self.notifier else {
            report.skip(Stage::NotifyWorkflow, "workflow webhook not configured");
            return;
        };

        let mut notifications = vec![WorkflowNotification {
            file_type: NotifiedFileType::Video,
            file_id: job.file_id.clone(),
            file_name: relocated.new_name.clone(),
        }];

        if let (true, Some(thumbnail)) = (job.is_long, thumbnail) {
            notifications.push(WorkflowNotification {
                file_type: NotifiedFileType::Thumbnail,
                file_id: thumbnail.file_id.clone(),
                file_name: thumbnail.file_name.clone(),
            });
        }

        let mut failures = Vec::new();
        for notification in &notifications {
            if let Err(e) = notifier.notify(notification).await {
                tracing::warn!(
                    error = %e,
                    file_id = %notification.file_id,
                    "⚠️ Workflow notification failed, continuing"
                );
                failures.push(e.to_string());
            }
        }

        if failures.is_empty() {
            report.record(Stage::NotifyWorkflow, StageStatus::Succeeded);
        } else {
            report.record(
                Stage::NotifyWorkflow,
                StageStatus::Failed {
                    error: failures.join("; "),
                },
            );
        }
    }
}

async fn track<T, F>(report: &mut PipelineReport, stage: Stage, step: F) -> StageResult<T>
where
    F: Future<Output = Result<T>>,
{
    tracing::debug!(stage = %stage, "▶️ stage started");

    match step.await {
        Ok(value) => {
            report.record(stage, StageStatus::Succeeded);
            Ok(value)
        }
        Err(e) => {
            tracing::error!(stage = %stage, error = %e, "❌ stage failed");
            report.record(
                stage,
                StageStatus::Failed {
                    error: e.to_string(),
                },
            );
            Err((stage, e))
        }
    }
}
