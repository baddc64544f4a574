use std::sync::Arc;

use drive_publisher::config::{AppConfig, CredentialSource};
use drive_publisher::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging()?;

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("❌ {}", e);
        e
    })?;

    log_configuration(&config);

    if let Err(e) = tokio::fs::create_dir_all(&config.download_dir).await {
        tracing::warn!("Failed to create download directory {}: {}", config.download_dir.display(), e);
    }

    let shared_state = Arc::new(AppState::from_config(&config));
    let app = build_router(shared_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

// Logging configuration
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,drive_publisher=trace,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,drive_publisher=info,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        // JSON logging for log aggregation
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init()?;

    tracing::info!("🎬 drive_publisher starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Log level: {}", log_level);

    Ok(())
}

fn log_configuration(config: &AppConfig) {
    let credentials = match &config.credential_source {
        CredentialSource::RefreshToken(_) => "refresh token".to_string(),
        CredentialSource::TokenFile(path) => format!("token file ({})", path.display()),
    };

    tracing::info!(
        "Configuration - Port: {}, Credentials: {}, Sheet range: {}, Workflow webhook: {}",
        config.port,
        credentials,
        config.sheet.range,
        if config.workflow_webhook_url.is_some() { "✅" } else { "❌" }
    );
    tracing::info!("Download directory: {}", config.download_dir.display());
}
