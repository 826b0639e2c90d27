//! drive-qa: question answering over the documents of a Google Drive folder
//!
//! Authenticates against Google Drive, lists the native documents and PDFs of a
//! folder, extracts their text and answers a fixed list of questions against the
//! combined text with an extractive question-answering model.

pub mod args;
pub mod auth;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod report;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use types::{
    document::{DocumentKind, ExtractedDocument, FileRef},
    query::{QaAnswer, QueryResult},
};
