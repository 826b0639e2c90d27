//! Plain-text extraction from fetched document bytes

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;

use crate::error::{Error, Result};
use crate::types::DocumentKind;

/// Main body part of a WordprocessingML archive
const DOCX_BODY_PART: &str = "word/document.xml";

/// Converts fetched bytes to plain text
pub struct TextExtractor;

impl TextExtractor {
    /// Extract text according to the document kind
    pub fn extract(data: &[u8], kind: DocumentKind) -> Result<String> {
        match kind {
            DocumentKind::NativeDocument => Self::extract_docx(data),
            DocumentKind::Pdf => Self::extract_pdf(data),
        }
    }

    /// Extract text from bytes tagged with a Drive MIME type
    pub fn extract_mime(data: &[u8], mime_type: &str) -> Result<String> {
        let kind = DocumentKind::from_mime_type(mime_type)
            .ok_or_else(|| Error::UnsupportedMimeType(mime_type.to_string()))?;
        Self::extract(data, kind)
    }

    /// Body text of an exported DOCX archive
    fn extract_docx(data: &[u8]) -> Result<String> {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data))
            .map_err(|e| Error::file_parse("document.docx", e.to_string()))?;

        let mut xml = String::new();
        archive
            .by_name(DOCX_BODY_PART)
            .map_err(|e| Error::file_parse("document.docx", format!("{}: {}", DOCX_BODY_PART, e)))?
            .read_to_string(&mut xml)
            .map_err(|e| Error::file_parse("document.docx", e.to_string()))?;

        Self::extract_text_from_docx_xml(&xml)
    }

    /// Walk WordprocessingML: text runs are concatenated, tabs and breaks kept,
    /// one newline per paragraph
    fn extract_text_from_docx_xml(xml: &str) -> Result<String> {
        let mut reader = Reader::from_str(xml);

        let mut text = String::new();
        let mut in_text_element = false;
        // <w:tabs> holds tab stop definitions, not tab characters
        let mut tab_stops_depth = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"t" => in_text_element = true,
                    b"tabs" => tab_stops_depth += 1,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"tab" if tab_stops_depth == 0 => text.push('\t'),
                    b"br" | b"cr" | b"p" => text.push('\n'),
                    _ => {}
                },
                Ok(Event::Text(e)) if in_text_element => {
                    let unescaped = e
                        .unescape()
                        .map_err(|e| Error::file_parse("document.docx", e.to_string()))?;
                    text.push_str(&unescaped);
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"t" => in_text_element = false,
                    b"tabs" => tab_stops_depth = tab_stops_depth.saturating_sub(1),
                    b"p" => text.push('\n'),
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::file_parse(
                        "document.docx",
                        format!("Malformed XML at position {}: {}", reader.buffer_position(), e),
                    ))
                }
                _ => {}
            }
        }

        Ok(text)
    }

    /// Page texts of a PDF concatenated in page order. Pages without
    /// extractable text contribute nothing.
    fn extract_pdf(data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse("document.pdf", format!("Failed to load PDF: {}", e)))?;

        let mut text = String::new();
        for page_number in doc.get_pages().into_keys() {
            match doc.extract_text(&[page_number]) {
                Ok(page_text) => text.push_str(&page_text.replace('\0', "")),
                Err(e) => tracing::debug!("No text extracted from page {}: {}", page_number, e),
            }
        }

        Ok(text)
    }
}
