//! Document references and extracted text

use serde::{Deserialize, Serialize};

/// MIME type of native Google Docs documents
pub const NATIVE_DOCUMENT_MIME: &str = "application/vnd.google-apps.document";

/// MIME type of PDF files
pub const PDF_MIME: &str = "application/pdf";

/// MIME type of Drive folders
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Office document format native documents are exported to
pub const DOCX_EXPORT_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// How the bytes of a document are retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Convert to `mime_type` on the server side
    Export { mime_type: &'static str },
    /// Download the stored bytes
    Download,
}

/// Supported document kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Google Docs document, exported as DOCX
    NativeDocument,
    /// PDF file, downloaded as-is
    Pdf,
}

impl DocumentKind {
    /// Map a Drive MIME type to a supported kind
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        match mime_type {
            NATIVE_DOCUMENT_MIME => Some(Self::NativeDocument),
            PDF_MIME => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Drive MIME type of this kind
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::NativeDocument => NATIVE_DOCUMENT_MIME,
            Self::Pdf => PDF_MIME,
        }
    }

    /// How to retrieve this kind's bytes
    pub fn fetch_mode(&self) -> FetchMode {
        match self {
            Self::NativeDocument => FetchMode::Export {
                mime_type: DOCX_EXPORT_MIME,
            },
            Self::Pdf => FetchMode::Download,
        }
    }

    /// Extension of the bytes fetched for this kind
    pub fn extension(&self) -> &'static str {
        match self {
            Self::NativeDocument => "docx",
            Self::Pdf => "pdf",
        }
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NativeDocument => "Google Docs document",
            Self::Pdf => "PDF document",
        }
    }
}

/// A supported file in the scanned folder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRef {
    /// Drive file ID
    pub id: String,
    /// File name as shown in Drive
    pub name: String,
    /// Document kind
    pub kind: DocumentKind,
    /// `<folder>/<name>.<ext>`, for display only
    pub full_path: String,
}

impl FileRef {
    /// Create a file reference, synthesizing its display path
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: DocumentKind, folder_name: &str) -> Self {
        let name = name.into();
        let full_path = format!("{}/{}.{}", folder_name, name, kind.extension());
        Self {
            id: id.into(),
            name,
            kind,
            full_path,
        }
    }

    /// Drive MIME type
    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }
}

/// Text extracted from one fetched file
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// File the text came from
    pub source: FileRef,
    /// Plain text content
    pub text: String,
}
