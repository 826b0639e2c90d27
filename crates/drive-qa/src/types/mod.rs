//! Core types for documents and answers

pub mod document;
pub mod query;

pub use document::{DocumentKind, ExtractedDocument, FetchMode, FileRef};
pub use query::{QaAnswer, QueryResult};
