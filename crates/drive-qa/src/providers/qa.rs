//! Question-answering capability

use async_trait::async_trait;

use crate::error::Result;
use crate::types::QaAnswer;

/// Trait for extractive question answering
///
/// Implementations:
/// - `HfInferenceQa`: hosted inference endpoint
/// - `OnnxQaModel`: local ONNX model (feature `onnx`)
#[async_trait]
pub trait QaProvider: Send + Sync {
    /// Answer `question` from `context`, returning the span and its confidence
    async fn answer(&self, question: &str, context: &str) -> Result<QaAnswer>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
