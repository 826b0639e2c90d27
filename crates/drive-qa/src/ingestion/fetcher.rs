//! Retrieve document bytes in a parseable format

use std::sync::Arc;

use crate::error::Result;
use crate::providers::DriveApi;
use crate::types::{FetchMode, FileRef};

/// Fetches the bytes of listed documents
pub struct DocumentFetcher {
    drive: Arc<dyn DriveApi>,
}

impl DocumentFetcher {
    /// Create a fetcher over `drive`
    pub fn new(drive: Arc<dyn DriveApi>) -> Self {
        Self { drive }
    }

    /// Export native documents to DOCX, download PDFs as stored.
    /// Remote failures are returned unchanged; there is no retry.
    pub async fn fetch(&self, file: &FileRef) -> Result<Vec<u8>> {
        tracing::debug!("Fetching {} ({})", file.full_path, file.kind.display_name());
        match file.kind.fetch_mode() {
            FetchMode::Export { mime_type } => self.drive.export(&file.id, mime_type).await,
            FetchMode::Download => self.drive.download(&file.id).await,
        }
    }
}
