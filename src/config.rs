// Typed configuration read from the environment (and .env via dotenvy)

use std::path::PathBuf;

use crate::error::{PipelineError, Result};
use crate::models::{MatchOptions, MetadataDefaults, Visibility};

/// Base URLs for every Google endpoint the service talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub sheets_api: String,
    pub drive_api: String,
    pub youtube_api: String,
    pub youtube_upload_api: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            sheets_api: "https://sheets.googleapis.com/v4".to_string(),
            drive_api: "https://www.googleapis.com/drive/v3".to_string(),
            youtube_api: "https://www.googleapis.com/youtube/v3".to_string(),
            youtube_upload_api: "https://www.googleapis.com/upload/youtube/v3".to_string(),
        }
    }
}

impl GoogleEndpoints {
    /// Points every endpoint at one host, keeping the usual path layout (used against mock servers)
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            auth_url: format!("{}/o/oauth2/v2/auth", base),
            token_url: format!("{}/token", base),
            sheets_api: format!("{}/v4", base),
            drive_api: format!("{}/drive/v3", base),
            youtube_api: format!("{}/youtube/v3", base),
            youtube_upload_api: format!("{}/upload/youtube/v3", base),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveScope {
    Full,
    ReadOnly,
}

impl DriveScope {
    pub fn scope_url(&self) -> &'static str {
        match self {
            DriveScope::Full => "https://www.googleapis.com/auth/drive",
            DriveScope::ReadOnly => "https://www.googleapis.com/auth/drive.readonly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub drive_scope: DriveScope,
}

impl OAuthConfig {
    pub fn scopes(&self) -> Vec<&'static str> {
        vec![
            "https://www.googleapis.com/auth/youtube.upload",
            self.drive_scope.scope_url(),
        ]
    }
}

/// Where per-request access tokens come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Exchange a long-lived refresh token on every request
    RefreshToken(String),
    /// Apply the token JSON persisted by the consent flow
    TokenFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    /// A1 range covering columns A..H, e.g. `D_Sheet!A2:H`
    pub range: String,
    pub match_options: MatchOptions,
    pub defaults: MetadataDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishFolders {
    pub longform: String,
    pub shortform: String,
}

impl FinishFolders {
    pub fn for_kind(&self, is_long: bool) -> &str {
        if is_long {
            &self.longform
        } else {
            &self.shortform
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub oauth: OAuthConfig,
    pub credential_source: CredentialSource,
    /// File the consent callback writes tokens to
    pub token_path: PathBuf,
    pub sheet: SheetConfig,
    pub folders: FinishFolders,
    pub workflow_webhook_url: Option<String>,
    pub download_dir: PathBuf,
    pub endpoints: GoogleEndpoints,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| PipelineError::Config(format!("{} must be set", key)))
        };
        let flag = |key: &str, default: bool| -> Result<bool> {
            match get(key) {
                None => Ok(default),
                Some(v) => match v.to_ascii_lowercase().as_str() {
                    "1" | "true" | "yes" | "on" => Ok(true),
                    "0" | "false" | "no" | "off" => Ok(false),
                    _ => Err(PipelineError::Config(format!("{} must be a boolean, got '{}'", key, v))),
                },
            }
        };

        let port = match get("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| PipelineError::Config(format!("PORT must be a port number, got '{}'", p)))?,
            None => {
                tracing::warn!("PORT not set, defaulting to 3000");
                3000
            }
        };

        let drive_scope = match get("DRIVE_SCOPE").as_deref() {
            None | Some("drive") => DriveScope::Full,
            Some("drive.readonly") => DriveScope::ReadOnly,
            Some(other) => {
                return Err(PipelineError::Config(format!(
                    "DRIVE_SCOPE must be 'drive' or 'drive.readonly', got '{}'",
                    other
                )))
            }
        };

        let oauth = OAuthConfig {
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            redirect_uri: required("REDIRECT_URI")?,
            drive_scope,
        };

        let token_path = PathBuf::from(get("TOKEN_PATH").unwrap_or_else(|| "token.json".to_string()));
        let refresh_token = get("REFRESH_TOKEN");

        let credential_source = match (get("CREDENTIAL_SOURCE").as_deref(), refresh_token) {
            (Some("token_file"), _) | (None, None) => CredentialSource::TokenFile(token_path.clone()),
            (Some("refresh_token"), Some(token)) | (None, Some(token)) => CredentialSource::RefreshToken(token),
            (Some("refresh_token"), None) => {
                return Err(PipelineError::Config(
                    "CREDENTIAL_SOURCE=refresh_token requires REFRESH_TOKEN".to_string(),
                ))
            }
            (Some(other), _) => {
                return Err(PipelineError::Config(format!(
                    "CREDENTIAL_SOURCE must be 'refresh_token' or 'token_file', got '{}'",
                    other
                )))
            }
        };

        let default_visibility = match get("DEFAULT_VISIBILITY") {
            Some(v) => v.parse::<Visibility>().map_err(PipelineError::Config)?,
            None => Visibility::Unlisted,
        };

        let sheet = SheetConfig {
            spreadsheet_id: required("SPREADSHEET_ID")?,
            range: get("SHEET_RANGE").unwrap_or_else(|| "D_Sheet!A2:H".to_string()),
            match_options: MatchOptions {
                case_insensitive: flag("SHEET_MATCH_CASE_INSENSITIVE", true)?,
                trim: flag("SHEET_MATCH_TRIM", true)?,
            },
            defaults: MetadataDefaults {
                category_id: get("DEFAULT_CATEGORY_ID").unwrap_or_else(|| "22".to_string()),
                visibility: default_visibility,
            },
        };

        let folders = FinishFolders {
            longform: required("LONGFORM_FINISH_FOLDER_ID")?,
            shortform: required("SHORTFORM_FINISH_FOLDER_ID")?,
        };

        Ok(Self {
            port,
            oauth,
            credential_source,
            token_path,
            sheet,
            folders,
            workflow_webhook_url: get("WORKFLOW_WEBHOOK_URL"),
            download_dir: get("DOWNLOAD_DIR").map(PathBuf::from).unwrap_or_else(std::env::temp_dir),
            endpoints: GoogleEndpoints::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("CLIENT_ID", "client"),
            ("CLIENT_SECRET", "secret"),
            ("REDIRECT_URI", "http://localhost:3000/oauth2callback"),
            ("SPREADSHEET_ID", "sheet-1"),
            ("LONGFORM_FINISH_FOLDER_ID", "LONG"),
            ("SHORTFORM_FINISH_FOLDER_ID", "SHORT"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<AppConfig> {
        AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = load(&base_env()).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.sheet.range, "D_Sheet!A2:H");
        assert_eq!(config.sheet.match_options, MatchOptions::default());
        assert_eq!(config.sheet.defaults, MetadataDefaults::default());
        assert_eq!(config.oauth.drive_scope, DriveScope::Full);
        assert_eq!(config.credential_source, CredentialSource::TokenFile(PathBuf::from("token.json")));
        assert_eq!(config.workflow_webhook_url, None);
    }

    #[test]
    fn test_refresh_token_selects_refresh_strategy() {
        let mut env = base_env();
        env.insert("REFRESH_TOKEN", "1//refresh");
        env.insert("PORT", "8080");

        let config = load(&env).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.credential_source, CredentialSource::RefreshToken("1//refresh".to_string()));

        env.insert("CREDENTIAL_SOURCE", "token_file");
        let config = load(&env).unwrap();
        assert!(matches!(config.credential_source, CredentialSource::TokenFile(_)));
    }

    #[test]
    fn test_missing_required_variable() {
        let mut env = base_env();
        env.remove("LONGFORM_FINISH_FOLDER_ID");

        let err = load(&env).unwrap_err();
        assert!(err.to_string().contains("LONGFORM_FINISH_FOLDER_ID"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut env = base_env();
        env.insert("PORT", "eighty");
        assert!(matches!(load(&env), Err(PipelineError::Config(_))));

        let mut env = base_env();
        env.insert("SHEET_MATCH_TRIM", "maybe");
        assert!(matches!(load(&env), Err(PipelineError::Config(_))));

        let mut env = base_env();
        env.insert("CREDENTIAL_SOURCE", "refresh_token");
        assert!(matches!(load(&env), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_match_and_default_overrides() {
        let mut env = base_env();
        env.insert("SHEET_MATCH_CASE_INSENSITIVE", "false");
        env.insert("DEFAULT_VISIBILITY", "private");
        env.insert("DEFAULT_CATEGORY_ID", "27");
        env.insert("DRIVE_SCOPE", "drive.readonly");

        let config = load(&env).unwrap();
        assert!(!config.sheet.match_options.case_insensitive);
        assert!(config.sheet.match_options.trim);
        assert_eq!(config.sheet.defaults.visibility, Visibility::Private);
        assert_eq!(config.sheet.defaults.category_id, "27");
        assert_eq!(
            config.oauth.scopes(),
            vec![
                "https://www.googleapis.com/auth/youtube.upload",
                "https://www.googleapis.com/auth/drive.readonly"
            ]
        );
    }

    #[test]
    fn test_finish_folder_selection() {
        let folders = FinishFolders {
            longform: "LONG".to_string(),
            shortform: "SHORT".to_string(),
        };
        assert_eq!(folders.for_kind(true), "LONG");
        assert_eq!(folders.for_kind(false), "SHORT");
    }
}
