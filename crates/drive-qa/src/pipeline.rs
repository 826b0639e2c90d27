//! End-to-end run: list the folder, extract, answer

use std::sync::Arc;

use crate::error::Result;
use crate::generation::QueryAnswerer;
use crate::ingestion::{DocumentFetcher, FolderLister};
use crate::providers::{DriveApi, QaProvider};
use crate::types::{FileRef, QueryResult};

/// Wires the listing, extraction and answering stages over one Drive account
pub struct Pipeline {
    lister: FolderLister,
    answerer: QueryAnswerer,
}

impl Pipeline {
    pub fn new(drive: Arc<dyn DriveApi>, qa: Arc<dyn QaProvider>) -> Self {
        Self {
            lister: FolderLister::new(drive.clone()),
            answerer: QueryAnswerer::new(DocumentFetcher::new(drive), qa),
        }
    }

    /// Supported documents of `folder_name`; empty when the folder is missing
    pub async fn list(&self, folder_name: &str) -> Result<Vec<FileRef>> {
        self.lister.documents_in_folder(folder_name).await
    }

    /// Extract `files` and answer `questions` against their combined text
    pub async fn answer(&self, questions: &[String], files: &[FileRef]) -> Vec<QueryResult> {
        self.answerer.run(questions, files).await
    }

    /// Answer `questions` from the supported documents of `folder_name`.
    ///
    /// A missing folder means an empty context; the questions are asked
    /// anyway. Only a failed folder listing aborts the run.
    pub async fn run(&self, folder_name: &str, questions: &[String]) -> Result<Vec<QueryResult>> {
        let files = self.list(folder_name).await?;
        Ok(self.answer(questions, &files).await)
    }
}
