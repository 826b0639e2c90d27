//! Hosted question-answering inference over HTTP
//!
//! Talks to a Hugging Face style inference endpoint serving an extractive QA
//! model (`bert-large-uncased-whole-word-masking-finetuned-squad` by default).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::qa::QaProvider;
use crate::config::QaConfig;
use crate::error::{Error, Result};
use crate::types::QaAnswer;

#[derive(Serialize)]
struct QaRequest<'a> {
    inputs: QaInputs<'a>,
    options: QaOptions,
}

#[derive(Serialize)]
struct QaInputs<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Serialize)]
struct QaOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct QaSpan {
    answer: String,
    score: f32,
    #[serde(default)]
    start: Option<usize>,
    #[serde(default)]
    end: Option<usize>,
}

/// Endpoints return either one span or a ranked list of spans
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QaResponse {
    Single(QaSpan),
    Ranked(Vec<QaSpan>),
}

impl QaResponse {
    fn into_best(self) -> Option<QaSpan> {
        match self {
            Self::Single(span) => Some(span),
            Self::Ranked(spans) => spans.into_iter().next(),
        }
    }
}

/// Hosted inference QA provider
pub struct HfInferenceQa {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
    model: String,
}

impl HfInferenceQa {
    /// Create a provider; the API token is read from `config.api_token_env`
    pub fn new(config: &QaConfig) -> Result<Self> {
        let api_token = std::env::var(&config.api_token_env)
            .ok()
            .filter(|t| !t.is_empty());
        if api_token.is_none() {
            tracing::warn!(
                "{} is not set, calling the inference endpoint anonymously",
                config.api_token_env
            );
        }
        Self::with_token(config, api_token)
    }

    /// Create a provider with an explicit API token
    pub fn with_token(config: &QaConfig, api_token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint(&config.base_url, &config.model),
            api_token,
            model: config.model.clone(),
        })
    }
}

fn endpoint(base_url: &str, model: &str) -> String {
    format!("{}/models/{}", base_url.trim_end_matches('/'), model)
}

#[async_trait]
impl QaProvider for HfInferenceQa {
    async fn answer(&self, question: &str, context: &str) -> Result<QaAnswer> {
        let request = QaRequest {
            inputs: QaInputs { question, context },
            options: QaOptions {
                wait_for_model: true,
            },
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::qa(format!("Inference request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::qa(format!("Inference error ({}): {}", status, body)));
        }

        let parsed: QaResponse = response
            .json()
            .await
            .map_err(|e| Error::qa(format!("Failed to parse inference response: {}", e)))?;

        let span = parsed
            .into_best()
            .ok_or_else(|| Error::qa("Inference returned no answer"))?;

        Ok(QaAnswer {
            text: span.answer,
            score: span.score,
            start: span.start,
            end: span.end,
        })
    }

    fn name(&self) -> &str {
        "hf-inference"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
