//! Speech-to-text collaborator interface.
//!
//! The engine itself is external; the pipeline depends only on the
//! `Transcriber` contract: ordered, non-overlapping fragments with
//! start <= end. The shipped implementation drives a whisper.cpp CLI
//! binary and parses its JSON output.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{PipelineError, StageResult};
use meetcap_models::TranscriptFragment;

/// Produces a time-coded transcript for an audio file.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> StageResult<Vec<TranscriptFragment>>;
}

/// Transcriber backed by the whisper.cpp command-line binary.
#[derive(Debug, Clone)]
pub struct WhisperCliTranscriber {
    /// Binary name or path (default `whisper-cli`)
    binary: String,
    /// Model file passed as `-m`
    model_path: PathBuf,
    /// Language hint, or None for auto-detect
    language: Option<String>,
}

impl WhisperCliTranscriber {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            binary: "whisper-cli".to_string(),
            model_path: model_path.into(),
            language: None,
        }
    }

    /// Create from environment (`MEETCAP_WHISPER_BIN`,
    /// `MEETCAP_WHISPER_MODEL`, `MEETCAP_LANGUAGE`).
    pub fn from_env() -> StageResult<Self> {
        let model_path = std::env::var("MEETCAP_WHISPER_MODEL")
            .map_err(|_| PipelineError::config_error("MEETCAP_WHISPER_MODEL not set"))?;

        let mut transcriber = Self::new(model_path);
        if let Ok(binary) = std::env::var("MEETCAP_WHISPER_BIN") {
            transcriber.binary = binary;
        }
        if let Ok(language) = std::env::var("MEETCAP_LANGUAGE") {
            transcriber.language = Some(language);
        }
        Ok(transcriber)
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> StageResult<Vec<TranscriptFragment>> {
        which::which(&self.binary).map_err(|_| {
            PipelineError::transcription_failed(format!(
                "transcription engine '{}' not found in PATH",
                self.binary
            ))
        })?;

        if !self.model_path.exists() {
            return Err(PipelineError::transcription_failed(format!(
                "model file not found: {}",
                self.model_path.display()
            )));
        }

        info!("Transcribing {} with {}", audio_path.display(), self.binary);

        // -oj writes <output>.json next to the requested output stem
        let output_stem = audio_path.with_extension("transcript");
        let mut command = tokio::process::Command::new(&self.binary);
        command
            .arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg(audio_path)
            .arg("-oj")
            .arg("-of")
            .arg(&output_stem);
        if let Some(ref language) = self.language {
            command.arg("-l").arg(language);
        }

        let output = command
            .output()
            .await
            .map_err(|e| PipelineError::transcription_failed(format!("failed to run engine: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::transcription_failed(format!(
                "engine exited with status {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let json_path = output_stem.with_extension("transcript.json");
        let content = tokio::fs::read_to_string(&json_path).await.map_err(|e| {
            PipelineError::transcription_failed(format!(
                "engine produced no output file {}: {}",
                json_path.display(),
                e
            ))
        })?;

        if let Err(e) = tokio::fs::remove_file(&json_path).await {
            warn!("Failed to remove engine output {}: {}", json_path.display(), e);
        }

        let parsed: WhisperOutput = serde_json::from_str(&content)
            .map_err(|e| PipelineError::transcription_failed(format!("malformed engine output: {}", e)))?;

        Ok(fragments_from_segments(parsed.transcription))
    }
}

/// whisper.cpp JSON output format (the subset we consume).
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    transcription: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    offsets: WhisperOffsets,
    text: String,
}

#[derive(Debug, Deserialize)]
struct WhisperOffsets {
    /// Start offset in milliseconds
    from: u64,
    /// End offset in milliseconds
    to: u64,
}

fn fragments_from_segments(segments: Vec<WhisperSegment>) -> Vec<TranscriptFragment> {
    segments
        .into_iter()
        .filter(|s| !s.text.trim().is_empty())
        .enumerate()
        .map(|(i, segment)| TranscriptFragment {
            id: i as u32,
            start_time: segment.offsets.from as f64 / 1000.0,
            end_time: segment.offsets.to as f64 / 1000.0,
            text: segment.text.trim().to_string(),
            confidence: 1.0,
        })
        .collect()
}
