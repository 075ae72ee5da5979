//! Transcript fragments and topical sections.

use serde::{Deserialize, Serialize};

/// One time-coded unit of transcribed speech.
///
/// Produced by the transcription collaborator; ordered and non-overlapping
/// by contract, and never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFragment {
    /// Sequential fragment id, 0-based
    pub id: u32,

    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds (start <= end)
    pub end_time: f64,

    /// Transcribed text
    pub text: String,

    /// Engine confidence in [0, 1]
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

impl TranscriptFragment {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// A maximal grouping of consecutive fragments bounded by pause/duration
/// rules.
///
/// Sections partition the fragment sequence exactly: every fragment lands in
/// exactly one section, in original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Sequential section number, 1-based
    pub number: u32,

    /// Start time of the first fragment
    pub start_time: f64,

    /// End time of the last fragment
    pub end_time: f64,

    /// Ordered, non-empty fragment run
    pub fragments: Vec<TranscriptFragment>,

    /// Section summary (model-backed or deterministic fallback)
    #[serde(default)]
    pub summary: String,

    /// Extracted key points
    #[serde(default)]
    pub key_points: Vec<String>,
}

impl Section {
    /// Combined text of all fragments, space-joined.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}
