//! In-memory doubles and fixture builders shared by unit tests

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;

use crate::auth::{Credential, IdentityProvider};
use crate::error::{Error, Result};
use crate::providers::drive::{DriveApi, DriveFile};
use crate::providers::QaProvider;
use crate::types::QaAnswer;

/// Credential with a refresh token and the given access token and expiry
pub fn credential(access_token: &str, expiry: Option<DateTime<Utc>>) -> Credential {
    Credential {
        access_token: access_token.to_string(),
        refresh_token: Some("refresh-token".to_string()),
        token_uri: crate::auth::credential::GOOGLE_TOKEN_URI.to_string(),
        client_id: "client-id.apps.googleusercontent.com".to_string(),
        client_secret: "client-secret".to_string(),
        scopes: vec!["https://www.googleapis.com/auth/drive".to_string()],
        expiry,
    }
}

/// Drive double. Every call is recorded as `"<operation> <args>"`.
#[derive(Default)]
pub struct MockDrive {
    folders: Vec<DriveFile>,
    children: HashMap<String, Vec<DriveFile>>,
    contents: HashMap<String, Vec<u8>>,
    fail_children: bool,
    calls: Mutex<Vec<String>>,
}

impl MockDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(mut self, name: &str, id: &str) -> Self {
        self.folders.push(DriveFile {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: Some(crate::types::document::FOLDER_MIME.to_string()),
        });
        self
    }

    /// Add a child of `folder_id`. A `None` MIME type makes its metadata lookup fail.
    pub fn with_file(mut self, folder_id: &str, id: &str, name: &str, mime_type: Option<&str>) -> Self {
        self.children.entry(folder_id.to_string()).or_default().push(DriveFile {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: mime_type.map(str::to_string),
        });
        self
    }

    /// Bytes served by both export and download for `id`
    pub fn with_content(mut self, id: &str, content: Vec<u8>) -> Self {
        self.contents.insert(id.to_string(), content);
        self
    }

    pub fn failing_children(mut self) -> Self {
        self.fail_children = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn content(&self, id: &str) -> Result<Vec<u8>> {
        self.contents
            .get(id)
            .cloned()
            .ok_or_else(|| Error::drive(format!("File not found: {}", id)))
    }
}

#[async_trait]
impl DriveApi for MockDrive {
    async fn find_folders(&self, name: &str) -> Result<Vec<DriveFile>> {
        self.record(format!("find_folders {}", name));
        Ok(self.folders.iter().filter(|f| f.name == name).cloned().collect())
    }

    async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        self.record(format!("list_children {}", folder_id));
        if self.fail_children {
            return Err(Error::drive("files.list failed (500 Internal Server Error)"));
        }
        // Listing does not carry MIME types; metadata lookups do
        Ok(self
            .children
            .get(folder_id)
            .map(|files| {
                files
                    .iter()
                    .map(|f| DriveFile {
                        mime_type: None,
                        ..f.clone()
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_metadata(&self, file_id: &str) -> Result<DriveFile> {
        self.record(format!("get_metadata {}", file_id));
        self.children
            .values()
            .flatten()
            .find(|f| f.id == file_id && f.mime_type.is_some())
            .cloned()
            .ok_or_else(|| Error::drive(format!("files.get failed (404 Not Found): {}", file_id)))
    }

    async fn export(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>> {
        self.record(format!("export {} {}", file_id, mime_type));
        self.content(file_id)
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        self.record(format!("download {}", file_id));
        self.content(file_id)
    }

    fn name(&self) -> &str {
        "mock-drive"
    }
}

/// QA double answering from a script, in order. Once the script is
/// exhausted the last entry is repeated.
pub struct MockQa {
    script: Vec<std::result::Result<QaAnswer, String>>,
    contexts: Mutex<Vec<String>>,
}

impl MockQa {
    /// Always answer `text` with `score`
    pub fn answering(text: &str, score: f32) -> Self {
        Self::scripted(vec![Ok(answer(text, score))])
    }

    pub fn scripted(script: Vec<std::result::Result<QaAnswer, String>>) -> Self {
        Self {
            script,
            contexts: Mutex::new(Vec::new()),
        }
    }

    /// Contexts received, one per call
    pub fn contexts(&self) -> Vec<String> {
        self.contexts.lock().clone()
    }
}

pub fn answer(text: &str, score: f32) -> QaAnswer {
    QaAnswer {
        text: text.to_string(),
        score,
        start: None,
        end: None,
    }
}

#[async_trait]
impl QaProvider for MockQa {
    async fn answer(&self, _question: &str, context: &str) -> Result<QaAnswer> {
        let call = {
            let mut contexts = self.contexts.lock();
            contexts.push(context.to_string());
            contexts.len() - 1
        };
        let entry = self
            .script
            .get(call)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_else(|| Err("empty script".to_string()));
        entry.map_err(Error::qa)
    }

    fn name(&self) -> &str {
        "mock-qa"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

/// Identity double: authorization yields `authorize_token`, refresh yields
/// the configured token or fails
pub struct MockIdentity {
    authorize_token: Option<String>,
    refresh_token: Option<String>,
    authorize_calls: Mutex<usize>,
    refresh_calls: Mutex<usize>,
}

impl MockIdentity {
    pub fn authorizing(token: &str) -> Self {
        Self {
            authorize_token: Some(token.to_string()),
            refresh_token: None,
            authorize_calls: Mutex::new(0),
            refresh_calls: Mutex::new(0),
        }
    }

    /// Authorization is denied and there is nothing to refresh with
    pub fn failing() -> Self {
        Self {
            authorize_token: None,
            ..Self::authorizing("")
        }
    }

    pub fn with_refresh(mut self, token: &str) -> Self {
        self.refresh_token = Some(token.to_string());
        self
    }

    pub fn authorize_calls(&self) -> usize {
        *self.authorize_calls.lock()
    }

    pub fn refresh_calls(&self) -> usize {
        *self.refresh_calls.lock()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn refresh(&self, current: &Credential) -> Result<Credential> {
        *self.refresh_calls.lock() += 1;
        let token = self
            .refresh_token
            .as_deref()
            .ok_or_else(|| Error::auth("invalid_grant: Token has been expired or revoked."))?;
        Ok(Credential {
            access_token: token.to_string(),
            expiry: Some(Utc::now() + Duration::hours(1)),
            ..current.clone()
        })
    }

    async fn authorize(&self, _scopes: &[String]) -> Result<Credential> {
        *self.authorize_calls.lock() += 1;
        let token = self
            .authorize_token
            .as_deref()
            .ok_or_else(|| Error::auth("access_denied"))?;
        Ok(credential(token, Some(Utc::now() + Duration::hours(1))))
    }
}

/// Minimal DOCX archive with one paragraph per entry
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", quick_xml::escape::escape(*p)))
        .collect();
    let document = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body>{}</w:body></w:document>"
        ),
        body
    );
    let content_types = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/word/document.xml" "#,
        r#"ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        "</Types>"
    );

    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(content_types.as_bytes()).unwrap();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(document.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

/// PDF with one page per entry; `None` pages have no content stream
pub fn pdf_bytes(pages: &[Option<&str>]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for page in pages {
        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources_id,
        };
        if let Some(text) = page {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            page_dict.set("Contents", content_id);
        }
        kids.push(Object::from(doc.add_object(page_dict)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
