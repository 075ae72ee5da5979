//! Pipeline error types.

use thiserror::Error;

pub type StageResult<T> = Result<T, PipelineError>;

/// Stage failure taxonomy.
///
/// Every fatal stage failure maps to exactly one of these; the message
/// carries the wrapped tool or collaborator diagnostic. Recoverable
/// conditions (frame persistence, model summarizer) are absorbed before
/// they reach this type.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Load failed: {0}")]
    LoadFailed(String),

    #[error("Audio extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Caption rendering failed: {0}")]
    RenderingFailed(String),

    #[error("Report generation failed: {0}")]
    ReportFailed(String),

    #[error("Job cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn load_failed(msg: impl Into<String>) -> Self {
        Self::LoadFailed(msg.into())
    }

    pub fn extraction_failed(msg: impl Into<String>) -> Self {
        Self::ExtractionFailed(msg.into())
    }

    pub fn transcription_failed(msg: impl Into<String>) -> Self {
        Self::TranscriptionFailed(msg.into())
    }

    pub fn rendering_failed(msg: impl Into<String>) -> Self {
        Self::RenderingFailed(msg.into())
    }

    pub fn report_failed(msg: impl Into<String>) -> Self {
        Self::ReportFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether this failure is a cancellation rather than an error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }
}
