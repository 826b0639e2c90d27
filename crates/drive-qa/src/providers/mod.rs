//! Provider abstractions for remote storage and question answering
//!
//! Trait-based so the pipeline can run against Google Drive and a hosted or
//! local QA model in production, and in-memory doubles in tests.

pub mod drive;
pub mod google_drive;
pub mod hf_inference;
pub mod qa;

#[cfg(feature = "onnx")]
pub mod onnx_qa;

pub use drive::{DriveApi, DriveFile};
pub use google_drive::GoogleDriveClient;
pub use hf_inference::HfInferenceQa;
pub use qa::QaProvider;

#[cfg(feature = "onnx")]
pub use onnx_qa::OnnxQaModel;

use std::sync::Arc;

use crate::config::{QaBackend, QaConfig};
use crate::error::Result;

/// Build the QA provider selected in the config
pub fn build_qa_provider(config: &QaConfig) -> Result<Arc<dyn QaProvider>> {
    match config.backend {
        QaBackend::HfInference => Ok(Arc::new(HfInferenceQa::new(config)?)),
        #[cfg(feature = "onnx")]
        QaBackend::Onnx => Ok(Arc::new(OnnxQaModel::new(config)?)),
        #[cfg(not(feature = "onnx"))]
        QaBackend::Onnx => Err(crate::error::Error::Config(
            "qa.backend = \"onnx\" requires building with the `onnx` feature".to_string(),
        )),
    }
}
