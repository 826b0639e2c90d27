//! Local extractive question answering with an ONNX model
//!
//! Expects a SQuAD-style model exported to `model.onnx` (inputs `input_ids`,
//! `attention_mask`, optionally `token_type_ids`; outputs `start_logits` and
//! `end_logits`) next to its `tokenizer.json`.
//!
//! Contexts longer than one window are split into overlapping windows; the
//! answer is the highest-scoring span over all windows, where a span's score
//! is `p_start * p_end` with probabilities taken over the context tokens.

use async_trait::async_trait;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use tokenizers::{Encoding, Tokenizer, TruncationDirection, TruncationParams, TruncationStrategy};

use super::qa::QaProvider;
use crate::config::QaConfig;
use crate::error::{Error, Result};
use crate::types::QaAnswer;

/// ONNX-based QA model
pub struct OnnxQaModel {
    /// ONNX Runtime session
    session: Mutex<Session>,
    /// HuggingFace tokenizer, truncating the context with a stride
    tokenizer: Tokenizer,
    /// Model name for logging
    model: String,
    /// Maximum answer length in tokens
    max_answer_length: usize,
    /// Whether the graph takes `token_type_ids`
    uses_token_type_ids: bool,
}

impl OnnxQaModel {
    /// Load `model.onnx` and `tokenizer.json` from `config.model_dir`
    pub fn new(config: &QaConfig) -> Result<Self> {
        let model_path = config.model_dir.join("model.onnx");
        let tokenizer_path = config.model_dir.join("tokenizer.json");
        for path in [&model_path, &tokenizer_path] {
            if !path.exists() {
                return Err(Error::Config(format!("QA model file not found: {}", path.display())));
            }
        }

        tracing::info!("Loading ONNX QA model from {}", config.model_dir.display());

        let session = Session::builder()
            .map_err(|e| Error::qa(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::qa(format!("Failed to set optimization level: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| Error::qa(format!("Failed to load model: {}", e)))?;

        let uses_token_type_ids = session.inputs.iter().any(|i| i.name == "token_type_ids");

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::qa(format!("Failed to load tokenizer: {}", e)))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_seq_length,
                stride: config.doc_stride,
                strategy: TruncationStrategy::OnlySecond,
                direction: TruncationDirection::Right,
            }))
            .map_err(|e| Error::qa(format!("Invalid truncation settings: {}", e)))?;
        tokenizer.with_padding(None);

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            model: config.model_dir.display().to_string(),
            max_answer_length: config.max_answer_length,
            uses_token_type_ids,
        })
    }

    /// Tokenize the pair into the first window plus its overflow windows
    fn windows(&self, question: &str, context: &str) -> Result<Vec<Encoding>> {
        let mut encoding = self
            .tokenizer
            .encode((question, context), true)
            .map_err(|e| Error::qa(format!("Tokenization failed: {}", e)))?;
        let overflowing = encoding.take_overflowing();

        let mut windows = Vec::with_capacity(1 + overflowing.len());
        windows.push(encoding);
        windows.extend(overflowing);
        Ok(windows)
    }

    /// Run the model on one window, returning start and end logits
    fn logits(&self, encoding: &Encoding) -> Result<(Vec<f32>, Vec<f32>)> {
        let len = encoding.get_ids().len();
        let to_i64 = |values: &[u32]| values.iter().map(|&v| v as i64).collect::<Vec<_>>();

        let tensor = |values: Vec<i64>, name: &str| {
            Tensor::from_array((vec![1, len], values.into_boxed_slice()))
                .map_err(|e| Error::qa(format!("{} tensor creation failed: {}", name, e)))
        };

        let mut inputs = vec![
            ("input_ids", tensor(to_i64(encoding.get_ids()), "input_ids")?.into_dyn()),
            (
                "attention_mask",
                tensor(to_i64(encoding.get_attention_mask()), "attention_mask")?.into_dyn(),
            ),
        ];
        if self.uses_token_type_ids {
            inputs.push((
                "token_type_ids",
                tensor(to_i64(encoding.get_type_ids()), "token_type_ids")?.into_dyn(),
            ));
        }

        let mut session = self.session.lock();
        let outputs = session
            .run(inputs)
            .map_err(|e| Error::qa(format!("Inference failed: {}", e)))?;

        let named: Vec<_> = outputs.iter().collect();
        let extract = |name: &str, position: usize| -> Result<Vec<f32>> {
            let value = named
                .iter()
                .find(|(n, _)| *n == name)
                .or_else(|| named.get(position))
                .map(|(_, v)| v)
                .ok_or_else(|| Error::qa(format!("Model produced no {}", name)))?;
            let (_, data) = value
                .try_extract_tensor::<f32>()
                .map_err(|e| Error::qa(format!("Failed to extract {}: {}", name, e)))?;
            Ok(data.to_vec())
        };

        Ok((extract("start_logits", 0)?, extract("end_logits", 1)?))
    }
}

/// Best span of one window, as token indices and score
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    start: usize,
    end: usize,
    score: f32,
}

/// Softmax over the positions in `mask`; other positions get probability 0
fn masked_softmax(logits: &[f32], mask: &[bool]) -> Vec<f32> {
    let max = logits
        .iter()
        .zip(mask)
        .filter(|(_, &m)| m)
        .map(|(&l, _)| l)
        .fold(f32::NEG_INFINITY, f32::max);
    if max == f32::NEG_INFINITY {
        return vec![0.0; logits.len()];
    }

    let exps: Vec<f32> = logits
        .iter()
        .zip(mask)
        .map(|(&l, &m)| if m { (l - max).exp() } else { 0.0 })
        .collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Highest `p_start * p_end` span with `start <= end < start + max_len`,
/// restricted to context tokens
fn best_span(start_logits: &[f32], end_logits: &[f32], is_context: &[bool], max_len: usize) -> Option<Span> {
    let p_start = masked_softmax(start_logits, is_context);
    let p_end = masked_softmax(end_logits, is_context);

    let mut best: Option<Span> = None;
    for start in (0..is_context.len()).filter(|&i| is_context[i]) {
        let last = (start + max_len).min(is_context.len());
        for end in (start..last).filter(|&j| is_context[j]) {
            let score = p_start[start] * p_end[end];
            if best.map_or(true, |b| score > b.score) {
                best = Some(Span { start, end, score });
            }
        }
    }
    best
}

#[async_trait]
impl QaProvider for OnnxQaModel {
    async fn answer(&self, question: &str, context: &str) -> Result<QaAnswer> {
        let mut best: Option<QaAnswer> = None;

        for window in self.windows(question, context)? {
            let is_context: Vec<bool> = window
                .get_sequence_ids()
                .iter()
                .map(|id| *id == Some(1))
                .collect();
            let (start_logits, end_logits) = self.logits(&window)?;

            let Some(span) = best_span(&start_logits, &end_logits, &is_context, self.max_answer_length)
            else {
                continue;
            };
            if best.as_ref().is_some_and(|b| b.score >= span.score) {
                continue;
            }

            let offsets = window.get_offsets();
            let (char_start, char_end) = (offsets[span.start].0, offsets[span.end].1);
            let text = context.get(char_start..char_end).unwrap_or_default().trim().to_string();
            best = Some(QaAnswer {
                text,
                score: span.score,
                start: Some(char_start),
                end: Some(char_end),
            });
        }

        Ok(best.unwrap_or(QaAnswer {
            text: String::new(),
            score: 0.0,
            start: None,
            end: None,
        }))
    }

    fn name(&self) -> &str {
        "onnx"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
