//! Question-answering results

use serde::{Deserialize, Serialize};

use super::document::FileRef;

/// Answer span returned by the QA capability
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaAnswer {
    /// Answer text
    pub text: String,
    /// Model confidence in [0, 1]
    pub score: f32,
    /// Start offset of the answer in the context, when reported
    #[serde(default)]
    pub start: Option<usize>,
    /// End offset of the answer in the context, when reported
    #[serde(default)]
    pub end: Option<usize>,
}

/// Outcome of one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// The question as asked
    pub question: String,
    /// Model answer; `None` when inference failed for this question
    pub answer: Option<QaAnswer>,
    /// Documents whose combined text formed the context
    pub sources: Vec<FileRef>,
}

impl QueryResult {
    /// Confidence score, if an answer was produced
    pub fn score(&self) -> Option<f32> {
        self.answer.as_ref().map(|a| a.score)
    }

    /// Whether the answer meets `threshold` (inclusive)
    pub fn meets_threshold(&self, threshold: f32) -> bool {
        self.score().is_some_and(|score| score >= threshold)
    }
}
