// Google OAuth 2.0: consent URL, code exchange, token persistence and per-request access tokens
// Docs: https://developers.google.com/identity/protocols/oauth2/web-server

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{CredentialSource, GoogleEndpoints, OAuthConfig};
use crate::error::{PipelineError, Result};

/// Bearer token authorizing Drive, Sheets and YouTube calls for one request
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Produces a fresh credential handle; nothing is cached between requests
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken>;
}

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    /// Everything else Google returned (`id_token`, `refresh_token_expires_in`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Token JSON persisted by the consent callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Expiry as epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredToken {
    pub fn from_response(response: GoogleTokenResponse, now_ms: i64) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            scope: response.scope,
            token_type: response.token_type,
            expiry_date: response.expires_in.map(|secs| now_ms + secs * 1000),
            extra: response.extra,
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        matches!(self.expiry_date, Some(expiry) if expiry <= now_ms)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            PipelineError::Credentials(format!("Cannot read token file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            PipelineError::Credentials(format!("Malformed token file {}: {}", path.display(), e))
        })
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, raw).await?;
        Ok(())
    }
}

/// OAuth client for the installed web application
#[derive(Debug, Clone)]
pub struct GoogleAuth {
    client: Client,
    oauth: OAuthConfig,
    endpoints: GoogleEndpoints,
}

impl GoogleAuth {
    pub fn new(client: Client, oauth: OAuthConfig, endpoints: GoogleEndpoints) -> Self {
        Self {
            client,
            oauth,
            endpoints,
        }
    }

    /// Consent URL requesting offline access with a forced consent prompt
    pub fn consent_url(&self) -> String {
        build_consent_url(
            &self.endpoints.auth_url,
            &self.oauth.client_id,
            &self.oauth.redirect_uri,
            &self.oauth.scopes(),
        )
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleTokenResponse> {
        let params = json!({
            "code": code,
            "client_id": self.oauth.client_id,
            "client_secret": self.oauth.client_secret,
            "redirect_uri": self.oauth.redirect_uri,
            "grant_type": "authorization_code"
        });
        self.token_request(&params).await
    }

    /// Refresh an access token using a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> Result<GoogleTokenResponse> {
        let params = json!({
            "client_id": self.oauth.client_id,
            "client_secret": self.oauth.client_secret,
            "refresh_token": refresh_token,
            "grant_type": "refresh_token"
        });
        self.token_request(&params).await
    }

    async fn token_request(&self, params: &serde_json::Value) -> Result<GoogleTokenResponse> {
        let response = self
            .client
            .post(&self.endpoints.token_url)
            .json(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = PipelineError::from_response("oauth", response).await;
            tracing::error!("❌ Token request failed: {}", err);
            return Err(PipelineError::Credentials(err.to_string()));
        }

        Ok(response.json().await?)
    }
}

/// Build Google OAuth authorization URL
pub fn build_consent_url(auth_url: &str, client_id: &str, redirect_uri: &str, scopes: &[&str]) -> String {
    let scope_string = scopes.join(" ");

    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        auth_url,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&scope_string),
    )
}

/// Exchanges the configured refresh token on every call
pub struct RefreshTokenCredentials {
    auth: GoogleAuth,
    refresh_token: String,
}

impl RefreshTokenCredentials {
    pub fn new(auth: GoogleAuth, refresh_token: String) -> Self {
        Self { auth, refresh_token }
    }
}

#[async_trait]
impl CredentialProvider for RefreshTokenCredentials {
    async fn access_token(&self) -> Result<AccessToken> {
        let response = self.auth.refresh(&self.refresh_token).await?;
        tracing::debug!("🔄 Access token refreshed from configured refresh token");
        Ok(AccessToken::new(response.access_token))
    }
}

/// Reads the persisted token file on every call
pub struct TokenFileCredentials {
    auth: GoogleAuth,
    path: PathBuf,
}

impl TokenFileCredentials {
    pub fn new(auth: GoogleAuth, path: PathBuf) -> Self {
        Self { auth, path }
    }
}

#[async_trait]
impl CredentialProvider for TokenFileCredentials {
    async fn access_token(&self) -> Result<AccessToken> {
        let stored = StoredToken::load(&self.path).await?;
        let now_ms = chrono::Utc::now().timestamp_millis();

        match (&stored.refresh_token, stored.is_expired(now_ms)) {
            (Some(refresh_token), true) => {
                tracing::info!("🔄 Stored access token expired, refreshing");
                let response = self.auth.refresh(refresh_token).await?;
                Ok(AccessToken::new(response.access_token))
            }
            _ => Ok(AccessToken::new(stored.access_token)),
        }
    }
}

/// Picks the credential strategy named by the configuration
pub fn credential_provider(auth: GoogleAuth, source: &CredentialSource) -> Arc<dyn CredentialProvider> {
    match source {
        CredentialSource::RefreshToken(token) => {
            tracing::info!("🔐 Using refresh-token credentials");
            Arc::new(RefreshTokenCredentials::new(auth, token.clone()))
        }
        CredentialSource::TokenFile(path) => {
            tracing::info!("🔐 Using token file credentials: {}", path.display());
            Arc::new(TokenFileCredentials::new(auth, path.clone()))
        }
    }
}
