//! Credential acquisition: load, refresh, or authorize

use chrono::Duration;
use std::path::PathBuf;
use std::sync::Arc;

use super::credential::Credential;
use super::oauth::IdentityProvider;
use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// What the token file yielded
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialState {
    /// No usable credential on disk
    Missing,
    /// Credential present but expired or missing its access token
    Expired(Credential),
    /// Credential usable as-is
    Valid(Credential),
}

/// Produces a usable credential for the Drive account
pub struct CredentialProvider {
    identity: Arc<dyn IdentityProvider>,
    token_path: PathBuf,
    scopes: Vec<String>,
    refresh_margin: Duration,
}

impl CredentialProvider {
    /// Create a provider persisting to `config.token_path`
    pub fn new(identity: Arc<dyn IdentityProvider>, config: &AuthConfig) -> Self {
        Self {
            identity,
            token_path: config.token_path.clone(),
            scopes: config.scopes.clone(),
            refresh_margin: Duration::seconds(config.refresh_margin_secs),
        }
    }

    /// Read the token file. An unreadable file counts as missing.
    pub fn load(&self) -> CredentialState {
        match Credential::load(&self.token_path) {
            Ok(Some(credential)) if credential.is_valid(self.refresh_margin) => {
                CredentialState::Valid(credential)
            }
            Ok(Some(credential)) => CredentialState::Expired(credential),
            Ok(None) => CredentialState::Missing,
            Err(e) => {
                tracing::warn!("Ignoring token file {}: {}", self.token_path.display(), e);
                CredentialState::Missing
            }
        }
    }

    /// Return a usable credential, refreshing or re-authorizing as needed.
    ///
    /// Any failure along the way is logged and reported as [`Error::Auth`];
    /// callers treat it as terminal.
    pub async fn authenticate(&self) -> Result<Credential> {
        self.acquire().await.map_err(|e| {
            tracing::error!("Error authenticating with OAuth 2.0 credentials: {}", e);
            match e {
                Error::Auth(_) => e,
                other => Error::auth(other.to_string()),
            }
        })
    }

    async fn acquire(&self) -> Result<Credential> {
        let refreshed = match self.load() {
            CredentialState::Valid(credential) => {
                tracing::debug!("Using cached credential from {}", self.token_path.display());
                return Ok(credential);
            }
            CredentialState::Expired(credential) => self.try_refresh(&credential).await,
            CredentialState::Missing => None,
        };

        let credential = match refreshed {
            Some(credential) => credential,
            None => {
                tracing::info!("Starting interactive authorization");
                self.identity.authorize(&self.scopes).await?
            }
        };

        credential.save(&self.token_path)?;
        tracing::info!("Credential saved to {}", self.token_path.display());
        Ok(credential)
    }

    async fn try_refresh(&self, credential: &Credential) -> Option<Credential> {
        if !credential.can_refresh() {
            tracing::info!("Cached credential expired and has no refresh token");
            return None;
        }

        match self.identity.refresh(credential).await {
            Ok(refreshed) if refreshed.is_valid(self.refresh_margin) => Some(refreshed),
            Ok(_) => {
                tracing::warn!("Refresh returned an already expired token");
                None
            }
            Err(e) => {
                tracing::warn!("Token refresh failed, re-authorizing: {}", e);
                None
            }
        }
    }
}
