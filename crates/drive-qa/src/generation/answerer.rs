//! Context building and per-question inference

use console::style;
use std::sync::Arc;

use crate::ingestion::{DocumentFetcher, TextExtractor};
use crate::providers::QaProvider;
use crate::types::{ExtractedDocument, FileRef, QueryResult};

/// Runs every question against the combined text of the fetched documents
pub struct QueryAnswerer {
    fetcher: DocumentFetcher,
    qa: Arc<dyn QaProvider>,
}

impl QueryAnswerer {
    /// Create an answerer fetching through `fetcher` and answering with `qa`
    pub fn new(fetcher: DocumentFetcher, qa: Arc<dyn QaProvider>) -> Self {
        Self { fetcher, qa }
    }

    /// Fetch and extract every file, in order.
    ///
    /// A file that cannot be fetched or parsed is logged and left out.
    pub async fn extract_documents(&self, files: &[FileRef]) -> Vec<ExtractedDocument> {
        println!("{}", style(format!("   Extracting text from {} documents", files.len())).cyan());

        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            println!("      Extracting text from {}", file.name);

            let text = match self.fetcher.fetch(file).await {
                Ok(bytes) => TextExtractor::extract_mime(&bytes, file.mime_type()),
                Err(e) => Err(e),
            };

            match text {
                Ok(text) => {
                    println!("{}", style(format!("         Text extracted from {}", file.name)).green());
                    documents.push(ExtractedDocument {
                        source: file.clone(),
                        text,
                    });
                }
                Err(e) => {
                    tracing::error!("Error extracting text from {}: {}", file.full_path, e);
                }
            }
        }

        documents
    }

    /// Join the non-empty texts with newlines, keeping document order
    pub fn build_context(documents: &[ExtractedDocument]) -> String {
        documents
            .iter()
            .map(|d| d.text.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Ask every question against the combined text, in order.
    ///
    /// One result per question, each listing `sources` as provenance whether
    /// or not their text made it into the context. A failed inference yields
    /// a result without an answer; the remaining questions still run.
    pub async fn answer_all(
        &self,
        questions: &[String],
        documents: &[ExtractedDocument],
        sources: &[FileRef],
    ) -> Vec<QueryResult> {
        let context = Self::build_context(documents);

        tracing::info!(
            "Answering {} questions over {} characters with {} ({})",
            questions.len(),
            context.len(),
            self.qa.name(),
            self.qa.model()
        );
        println!("{}", style(format!("   Processing {} queries", questions.len())).cyan());

        let mut results = Vec::with_capacity(questions.len());
        for (i, question) in questions.iter().enumerate() {
            println!("      Processing query {}", i + 1);

            let answer = match self.qa.answer(question, &context).await {
                Ok(answer) => Some(answer),
                Err(e) => {
                    tracing::error!("Question {} failed: {}", i + 1, e);
                    None
                }
            };

            println!("{}", style(format!("         Finished processing query {}", i + 1)).green());
            results.push(QueryResult {
                question: question.clone(),
                answer,
                sources: sources.to_vec(),
            });
        }

        results
    }

    /// Extract the files and answer every question. Every listed file is
    /// kept as provenance, including those whose text could not be extracted.
    pub async fn run(&self, questions: &[String], files: &[FileRef]) -> Vec<QueryResult> {
        let documents = self.extract_documents(files).await;
        self.answer_all(questions, &documents, files).await
    }
}
