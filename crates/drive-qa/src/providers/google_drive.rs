//! Google Drive v3 REST client

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::drive::{DriveApi, DriveFile};
use crate::auth::Credential;
use crate::config::DriveConfig;
use crate::error::{Error, Result};
use crate::types::document::FOLDER_MIME;

const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";
const METADATA_FIELDS: &str = "id, name, mimeType";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Drive client authorized with a user access token
pub struct GoogleDriveClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    page_size: u32,
}

impl GoogleDriveClient {
    /// Create a client for the account behind `credential`
    pub fn new(credential: &Credential, config: &DriveConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: credential.access_token.clone(),
            page_size: config.page_size,
        })
    }

    fn files_url(&self) -> String {
        format!("{}/files", self.base_url)
    }

    /// Run a files.list query, following pagination
    async fn list_files(&self, query: &str) -> Result<Vec<DriveFile>> {
        let page_size = self.page_size.to_string();
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("q", query),
                ("fields", LIST_FIELDS),
                ("pageSize", page_size.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let response = self
                .http
                .get(self.files_url())
                .bearer_auth(&self.access_token)
                .query(&params)
                .send()
                .await?;
            let page: FileList = check_status(response, "files.list").await?.json().await?;

            files.extend(page.files);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!("Query {:?} returned {} files", query, files.len());
        Ok(files)
    }

    async fn get_bytes(&self, url: String, params: &[(&str, &str)], operation: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .query(params)
            .send()
            .await?;
        let bytes = check_status(response, operation).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

async fn check_status(response: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::drive(format!("{} failed ({}): {}", operation, status, body)))
}

/// Quote a value for use inside a Drive query string literal
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Query matching folders named exactly `name`
pub fn folder_query(name: &str) -> String {
    format!(
        "name='{}' and mimeType='{}' and trashed=false",
        escape_query_value(name),
        FOLDER_MIME
    )
}

/// Query matching the direct children of a folder
pub fn children_query(folder_id: &str) -> String {
    format!("'{}' in parents and trashed=false", escape_query_value(folder_id))
}

#[async_trait]
impl DriveApi for GoogleDriveClient {
    async fn find_folders(&self, name: &str) -> Result<Vec<DriveFile>> {
        self.list_files(&folder_query(name)).await
    }

    async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        self.list_files(&children_query(folder_id)).await
    }

    async fn get_metadata(&self, file_id: &str) -> Result<DriveFile> {
        let response = self
            .http
            .get(format!("{}/{}", self.files_url(), file_id))
            .bearer_auth(&self.access_token)
            .query(&[("fields", METADATA_FIELDS)])
            .send()
            .await?;
        Ok(check_status(response, "files.get").await?.json().await?)
    }

    async fn export(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>> {
        self.get_bytes(
            format!("{}/{}/export", self.files_url(), file_id),
            &[("mimeType", mime_type)],
            "files.export",
        )
        .await
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        self.get_bytes(
            format!("{}/{}", self.files_url(), file_id),
            &[("alt", "media")],
            "files.get(media)",
        )
        .await
    }

    fn name(&self) -> &str {
        "google-drive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_query() {
        assert_eq!(
            folder_query("hudson_dias"),
            "name='hudson_dias' and mimeType='application/vnd.google-apps.folder' and trashed=false"
        );
    }

    #[test]
    fn test_folder_query_escapes_quotes() {
        assert_eq!(
            folder_query("Bob's \\notes"),
            "name='Bob\\'s \\\\notes' and mimeType='application/vnd.google-apps.folder' and trashed=false"
        );
    }

    #[test]
    fn test_children_query() {
        assert_eq!(children_query("1AbC"), "'1AbC' in parents and trashed=false");
    }

    #[test]
    fn test_file_list_parsing() {
        let page: FileList = serde_json::from_str(
            r#"{
                "nextPageToken": "tok",
                "files": [
                    {"id": "1", "name": "Cerrado", "mimeType": "application/vnd.google-apps.document"},
                    {"id": "2", "name": "photo.png"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(page.next_page_token.as_deref(), Some("tok"));
        assert_eq!(page.files.len(), 2);
        assert_eq!(
            page.files[0].mime_type.as_deref(),
            Some("application/vnd.google-apps.document")
        );
        assert_eq!(page.files[1].mime_type, None);

        let empty: FileList = serde_json::from_str("{}").unwrap();
        assert!(empty.files.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let credential = crate::test_support::credential("token", None);
        let config = DriveConfig {
            base_url: "http://localhost:9000/drive/v3/".to_string(),
            ..DriveConfig::default()
        };
        let client = GoogleDriveClient::new(&credential, &config).unwrap();
        assert_eq!(client.files_url(), "http://localhost:9000/drive/v3/files");
        assert_eq!(client.name(), "google-drive");
    }
}
