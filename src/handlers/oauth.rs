// OAuth consent flow: redirect to Google, then persist the tokens it hands back

use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::google_auth::StoredToken;
use crate::AppState;

pub fn oauth_routes() -> Router {
    Router::new()
        .route("/auth", get(start_consent))
        .route("/oauth2callback", get(oauth_callback))
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// 302 to the Google consent screen
pub async fn start_consent(Extension(state): Extension<Arc<AppState>>) -> Response {
    let auth_url = state.auth.consent_url();
    tracing::info!("🔐 Redirecting to Google OAuth consent screen");

    (StatusCode::FOUND, [(header::LOCATION, auth_url)]).into_response()
}

/// Exchange the authorization code and write the token JSON to the token file
pub async fn oauth_callback(
    Query(params): Query<OAuthCallbackQuery>,
    Extension(state): Extension<Arc<AppState>>,
) -> (StatusCode, String) {
    if let Some(error) = params.error {
        tracing::error!("OAuth consent denied: {}", error);
        return (StatusCode::BAD_REQUEST, format!("Authorization failed: {}", error));
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing authorization code".to_string());
    };

    let token_response = match state.auth.exchange_code(&code).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("❌ Failed to exchange code: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to exchange authorization code".to_string());
        }
    };

    if token_response.refresh_token.is_none() {
        tracing::warn!("No refresh token received; stored token cannot be refreshed once it expires");
    }

    let stored = StoredToken::from_response(token_response, chrono::Utc::now().timestamp_millis());
    match stored.save(&state.token_path).await {
        Ok(()) => {
            tracing::info!("✅ Token saved to {}", state.token_path.display());
            (StatusCode::OK, "Authentication successful. Token saved.".to_string())
        }
        Err(e) => {
            tracing::error!("❌ Failed to save token to {}: {}", state.token_path.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save token".to_string())
        }
    }
}
