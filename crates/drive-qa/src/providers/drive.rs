//! Remote file storage capability

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

/// File entry as returned by the storage API
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID
    pub id: String,
    /// File name
    pub name: String,
    /// MIME type, when the request asked for it
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Trait for the remote file store
///
/// Implementations:
/// - `GoogleDriveClient`: Google Drive v3 REST API
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Folders whose name is exactly `name`
    async fn find_folders(&self, name: &str) -> Result<Vec<DriveFile>>;

    /// Direct children of a folder
    async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveFile>>;

    /// Metadata (including MIME type) of one file
    async fn get_metadata(&self, file_id: &str) -> Result<DriveFile>;

    /// Convert a native document to `mime_type` and return the bytes
    async fn export(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>>;

    /// Raw file content
    async fn download(&self, file_id: &str) -> Result<Vec<u8>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
