//! Configuration for drive-qa

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "DRIVE_QA_CONFIG";

/// Config file used when `DRIVE_QA_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config/drive-qa.toml";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OAuth configuration
    pub auth: AuthConfig,
    /// Google Drive API configuration
    pub drive: DriveConfig,
    /// Question-answering model configuration
    pub qa: QaConfig,
    /// Report configuration
    pub report: ReportConfig,
    /// Questions asked against the folder contents, in report order
    pub questions: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            drive: DriveConfig::default(),
            qa: QaConfig::default(),
            report: ReportConfig::default(),
            questions: default_questions(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from the path in `DRIVE_QA_CONFIG`, or the default path
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load(path)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }
}

/// OAuth 2.0 configuration for the Drive account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// OAuth client descriptor downloaded from the Cloud console
    pub client_secrets_path: PathBuf,
    /// Persisted user credential
    pub token_path: PathBuf,
    /// Requested scopes
    pub scopes: Vec<String>,
    /// Port of the local redirect listener (0 picks a free port)
    pub callback_port: u16,
    /// A token expiring within this many seconds is treated as expired
    pub refresh_margin_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_secrets_path: PathBuf::from("config/google-drive-credentials.json"),
            token_path: PathBuf::from("config/google-drive-token.json"),
            scopes: vec!["https://www.googleapis.com/auth/drive".to_string()],
            callback_port: 0,
            refresh_margin_secs: 60,
        }
    }
}

/// Google Drive v3 API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// API base URL
    pub base_url: String,
    /// Page size for file listings
    pub page_size: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/drive/v3".to_string(),
            page_size: 100,
            timeout_secs: 120,
        }
    }
}

/// QA backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QaBackend {
    /// Hosted inference endpoint over HTTP
    #[default]
    HfInference,
    /// Local ONNX model (requires the `onnx` feature)
    Onnx,
}

/// Question-answering model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaConfig {
    /// Which backend answers questions
    pub backend: QaBackend,
    /// Hosted inference base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Environment variable holding the inference API token
    pub api_token_env: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Directory holding `model.onnx` and `tokenizer.json` for the ONNX backend
    pub model_dir: PathBuf,
    /// Maximum tokens per question/context window
    pub max_seq_length: usize,
    /// Token overlap between consecutive context windows
    pub doc_stride: usize,
    /// Maximum answer length in tokens
    pub max_answer_length: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            backend: QaBackend::HfInference,
            base_url: "https://api-inference.huggingface.co".to_string(),
            model: "bert-large-uncased-whole-word-masking-finetuned-squad".to_string(),
            api_token_env: "HF_API_TOKEN".to_string(),
            timeout_secs: 120,
            model_dir: PathBuf::from("models/bert-large-squad"),
            max_seq_length: 384,
            doc_stride: 128,
            max_answer_length: 15,
        }
    }
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Confidence threshold used when `--threshold` is not given
    pub default_threshold: f32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.5,
        }
    }
}

fn default_questions() -> Vec<String> {
    [
        "What are the two dominant seasons throughout the year in the Brazilian Cerrado?",
        "Which countries can rainforests be found in?",
        "What is the main seasons in the Cerrado?",
        "What is the average temperature in the Cerrado?",
        "How much Earth's rainwater is stored in the Amazon rainforest?",
        "Which percentage of modern medicines are derived from the Amazon rainforest?",
        "What does the elephant suggest the bookseller is, in the last part of the text?",
        "Who records the strength and skills of elephants?",
        "What comparison is made between man and the spaniel in the text?",
        "What is the underlying message or critique about human nature as compared to animals in the text?",
    ]
    .iter()
    .map(|q| q.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.questions.len(), 10);
        assert_eq!(config.report.default_threshold, 0.5);
        assert_eq!(config.qa.backend, QaBackend::HfInference);
        assert_eq!(config.auth.callback_port, 0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            questions = ["Where is the Cerrado?"]

            [qa]
            backend = "onnx"
            model_dir = "/opt/models/squad"

            [report]
            default_threshold = 0.7
            "#,
        )
        .unwrap();

        assert_eq!(config.questions, vec!["Where is the Cerrado?".to_string()]);
        assert_eq!(config.qa.backend, QaBackend::Onnx);
        assert_eq!(config.qa.model_dir, PathBuf::from("/opt/models/squad"));
        assert_eq!(config.qa.max_seq_length, 384);
        assert_eq!(config.report.default_threshold, 0.7);
        assert_eq!(config.drive.page_size, 100);
    }

    #[test]
    fn test_invalid_toml() {
        let err = AppConfig::from_toml("[qa]\nbackend = \"gpt\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load("/nonexistent/drive-qa.toml").unwrap();
        assert_eq!(config.drive.base_url, "https://www.googleapis.com/drive/v3");
    }
}
