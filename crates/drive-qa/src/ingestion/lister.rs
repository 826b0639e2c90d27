//! Folder resolution and document listing

use std::sync::Arc;

use crate::error::Result;
use crate::providers::DriveApi;
use crate::types::{DocumentKind, FileRef};

/// Lists the supported documents of a Drive folder
pub struct FolderLister {
    drive: Arc<dyn DriveApi>,
}

impl FolderLister {
    /// Create a lister over `drive`
    pub fn new(drive: Arc<dyn DriveApi>) -> Self {
        Self { drive }
    }

    /// ID of the first folder named exactly `name`, if any
    pub async fn resolve_folder(&self, name: &str) -> Result<Option<String>> {
        let folders = self.drive.find_folders(name).await?;
        Ok(folders.into_iter().next().map(|folder| folder.id))
    }

    /// Children of `folder_id` whose MIME type is supported.
    ///
    /// Each child's metadata is fetched to learn its type. Unsupported
    /// children and children whose metadata cannot be fetched are left out.
    pub async fn list_documents(&self, folder_id: &str, folder_name: &str) -> Result<Vec<FileRef>> {
        let children = self.drive.list_children(folder_id).await?;
        let mut documents = Vec::with_capacity(children.len());

        for child in children {
            let metadata = match self.drive.get_metadata(&child.id).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::error!("Error retrieving document metadata for ID {}: {}", child.id, e);
                    continue;
                }
            };

            let mime_type = metadata.mime_type.unwrap_or_default();
            match DocumentKind::from_mime_type(&mime_type) {
                Some(kind) => documents.push(FileRef::new(child.id, child.name, kind, folder_name)),
                None => tracing::warn!(
                    "Document '{}' has mime type {} and will be skipped.",
                    child.name,
                    if mime_type.is_empty() { "<unknown>" } else { mime_type.as_str() }
                ),
            }
        }

        Ok(documents)
    }

    /// Supported documents of the folder named `folder_name`.
    ///
    /// A folder that does not exist yields an empty list.
    pub async fn documents_in_folder(&self, folder_name: &str) -> Result<Vec<FileRef>> {
        let Some(folder_id) = self.resolve_folder(folder_name).await? else {
            tracing::error!("Folder '{}' not found in Google Drive.", folder_name);
            return Ok(Vec::new());
        };

        let documents = self.list_documents(&folder_id, folder_name).await?;
        tracing::info!(
            "Found {} supported documents in folder '{}'",
            documents.len(),
            folder_name
        );
        Ok(documents)
    }
}
