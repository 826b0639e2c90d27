//! Google OAuth 2.0 token endpoint client
//!
//! Implements the installed-application flow: the user authorizes in a
//! browser, Google redirects to a one-shot listener on the loopback interface,
//! and the authorization code is exchanged for tokens.

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::credential::{Credential, GOOGLE_TOKEN_URI};
use crate::error::{Error, Result};

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

const SUCCESS_PAGE: &str = "<html><body><h3>Authentication complete.</h3>\
<p>You may close this window and return to the terminal.</p></body></html>";

const FAILURE_PAGE: &str = "<html><body><h3>Authentication failed.</h3>\
<p>Return to the terminal for details.</p></body></html>";

/// Remote identity capability: token refresh and interactive authorization
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange the credential's refresh token for a new access token
    async fn refresh(&self, credential: &Credential) -> Result<Credential>;

    /// Run an interactive authorization for `scopes`
    async fn authorize(&self, scopes: &[String]) -> Result<Credential>;
}

/// OAuth client descriptor from the Cloud console
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Parse a client secrets file (`installed` or `web` application)
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ClientSecretsFile = serde_json::from_str(json)
            .map_err(|e| Error::auth(format!("Invalid client secrets format: {}", e)))?;
        file.installed
            .or(file.web)
            .ok_or_else(|| Error::auth("Client secrets must contain an 'installed' or 'web' entry"))
    }

    /// Load a client secrets file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::auth(format!("Failed to read client secrets {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Browser URL that starts the consent screen
    pub fn authorization_url(&self, redirect_uri: &str, scopes: &[String], state: &str) -> Result<Url> {
        let scope = scopes.join(" ");
        Url::parse_with_params(
            &self.auth_uri,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("scope", scope.as_str()),
                ("state", state),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| Error::auth(format!("Invalid auth_uri '{}': {}", self.auth_uri, e)))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// Google OAuth client for the installed-application flow
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_secrets_path: PathBuf,
    callback_port: u16,
}

impl GoogleOAuthClient {
    /// Create a client reading the OAuth descriptor from `client_secrets_path`
    pub fn new(client_secrets_path: impl Into<PathBuf>, callback_port: u16) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_secrets_path: client_secrets_path.into(),
            callback_port,
        }
    }

    async fn token_request(&self, token_uri: &str, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(token_uri)
            .form(form)
            .send()
            .await
            .map_err(|e| Error::auth(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!("Token exchange failed ({}): {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::auth(format!("Failed to parse token response: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuthClient {
    async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or_else(|| Error::auth("Credential has no refresh token"))?;

        tracing::info!("Refreshing access token");
        let token = self
            .token_request(
                &credential.token_uri,
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token),
                    ("client_id", credential.client_id.as_str()),
                    ("client_secret", credential.client_secret.as_str()),
                ],
            )
            .await?;

        let mut refreshed = credential.clone();
        apply_token(&mut refreshed, token);
        Ok(refreshed)
    }

    async fn authorize(&self, scopes: &[String]) -> Result<Credential> {
        let secrets = ClientSecrets::load(&self.client_secrets_path)?;

        let listener = TcpListener::bind(("127.0.0.1", self.callback_port))
            .await
            .map_err(|e| Error::auth(format!("Failed to start redirect listener: {}", e)))?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://127.0.0.1:{}/", port);
        let state = Uuid::new_v4().simple().to_string();

        let url = secrets.authorization_url(&redirect_uri, scopes, &state)?;
        println!("Please visit this URL to authorize this application: {}", url);
        tracing::info!(port, "Waiting for the authorization redirect");

        let code = wait_for_code(listener, &state).await?;

        let token = self
            .token_request(
                &secrets.token_uri,
                &[
                    ("grant_type", "authorization_code"),
                    ("code", code.as_str()),
                    ("client_id", secrets.client_id.as_str()),
                    ("client_secret", secrets.client_secret.as_str()),
                    ("redirect_uri", redirect_uri.as_str()),
                ],
            )
            .await?;

        let mut credential = Credential {
            access_token: String::new(),
            refresh_token: None,
            token_uri: secrets.token_uri,
            client_id: secrets.client_id,
            client_secret: secrets.client_secret,
            scopes: scopes.to_vec(),
            expiry: None,
        };
        apply_token(&mut credential, token);
        Ok(credential)
    }
}

fn apply_token(credential: &mut Credential, token: TokenResponse) {
    credential.access_token = token.access_token;
    credential.expiry = token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));
    if let Some(refresh_token) = token.refresh_token {
        credential.refresh_token = Some(refresh_token);
    }
    if let Some(scope) = token.scope {
        credential.scopes = scope.split_whitespace().map(str::to_string).collect();
    }
}

#[derive(Clone)]
struct RedirectState {
    expected_state: Arc<str>,
    sender: Arc<Mutex<Option<oneshot::Sender<Result<String>>>>>,
}

/// Serve the redirect URI until a request carries an authorization code or
/// an error. Other requests (favicon, stray requests) get a 404.
async fn wait_for_code(listener: TcpListener, expected_state: &str) -> Result<String> {
    let (code_tx, code_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new()
        .route("/", get(handle_redirect))
        .with_state(RedirectState {
            expected_state: Arc::from(expected_state),
            sender: Arc::new(Mutex::new(Some(code_tx))),
        });

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let outcome = code_rx
        .await
        .map_err(|_| Error::auth("Redirect listener stopped before authorization completed"));

    let _ = shutdown_tx.send(());
    match server.await {
        Ok(Err(e)) => tracing::debug!("Redirect listener error: {}", e),
        Err(e) => tracing::debug!("Redirect listener task failed: {}", e),
        Ok(Ok(())) => {}
    }

    outcome?
}

async fn handle_redirect(
    State(redirect): State<RedirectState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(outcome) = callback_outcome(&params, &redirect.expected_state) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let page = if outcome.is_ok() { SUCCESS_PAGE } else { FAILURE_PAGE };
    if let Some(sender) = redirect.sender.lock().take() {
        let _ = sender.send(outcome);
    }
    Html(page).into_response()
}

/// Interpret the redirect query.
///
/// `None` means the request carried neither a code nor an error and does not
/// end the flow.
fn callback_outcome(params: &HashMap<String, String>, expected_state: &str) -> Option<Result<String>> {
    if let Some(error) = params.get("error") {
        return Some(Err(Error::auth(format!("Authorization denied: {}", error))));
    }

    let code = params.get("code")?;
    if params.get("state").map(String::as_str) != Some(expected_state) {
        return Some(Err(Error::auth("Authorization redirect state mismatch")));
    }
    Some(Ok(code.clone()))
}
