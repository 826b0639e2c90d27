//! Persisted OAuth user credential

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Google's OAuth 2.0 token endpoint
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// User credential in Google's "authorized user" file format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credential {
    /// Bearer token for API calls
    #[serde(rename = "token", default)]
    pub access_token: String,
    /// Long-lived token used to obtain new access tokens
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Endpoint for refresh requests
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// OAuth client ID the credential was issued to
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Granted scopes
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Access token expiry (UTC)
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    /// Whether the access token expires within `margin` from now.
    /// A credential without an expiry never expires.
    pub fn is_expired(&self, margin: Duration) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= Utc::now() + margin)
    }

    /// Whether the credential can be used as-is
    pub fn is_valid(&self, margin: Duration) -> bool {
        !self.access_token.is_empty() && !self.is_expired(margin)
    }

    /// Whether a refresh token is available
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Read a credential file. A missing file is `Ok(None)`.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let credential = serde_json::from_str(&content).map_err(|e| {
            Error::auth(format!("Invalid token file {}: {}", path.display(), e))
        })?;
        Ok(Some(credential))
    }

    /// Write the credential, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expiry: Option<DateTime<Utc>>) -> Credential {
        Credential {
            access_token: "ya29.token".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            client_id: "client.apps.googleusercontent.com".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/drive".to_string()],
            expiry,
        }
    }

    #[test]
    fn test_expiry() {
        let margin = Duration::seconds(60);
        assert!(credential(None).is_valid(margin));
        assert!(credential(Some(Utc::now() + Duration::hours(1))).is_valid(margin));
        assert!(credential(Some(Utc::now() - Duration::hours(1))).is_expired(margin));
        // Inside the margin counts as expired
        assert!(credential(Some(Utc::now() + Duration::seconds(30))).is_expired(margin));
    }

    #[test]
    fn test_empty_token_is_invalid() {
        let mut c = credential(None);
        c.access_token.clear();
        assert!(!c.is_valid(Duration::zero()));
    }

    #[test]
    fn test_can_refresh() {
        let mut c = credential(None);
        assert!(c.can_refresh());
        c.refresh_token = Some(String::new());
        assert!(!c.can_refresh());
        c.refresh_token = None;
        assert!(!c.can_refresh());
    }

    #[test]
    fn test_parse_authorized_user_file() {
        let json = r#"{
            "token": "ya29.a0Af",
            "refresh_token": "1//0g",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "123.apps.googleusercontent.com",
            "client_secret": "GOCSPX-abc",
            "scopes": ["https://www.googleapis.com/auth/drive"],
            "expiry": "2024-03-01T10:15:30.123456Z"
        }"#;
        let c: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(c.access_token, "ya29.a0Af");
        assert_eq!(c.refresh_token.as_deref(), Some("1//0g"));
        assert!(c.is_expired(Duration::zero()));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token.json");

        assert!(Credential::load(&path).unwrap().is_none());

        let c = credential(Some(Utc::now() + Duration::hours(1)));
        c.save(&path).unwrap();
        let loaded = Credential::load(&path).unwrap().unwrap();
        assert_eq!(loaded, c);
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Credential::load(&path), Err(Error::Auth(_))));
    }
}
