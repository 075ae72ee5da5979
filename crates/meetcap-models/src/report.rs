//! Report payload and terminal pipeline result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::scene::Scene;
use crate::timecode::{format_hms, format_readable};
use crate::transcript::Section;

/// Master report payload, serialized once as JSON and converted to other
/// formats on demand by an external renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report title
    pub title: String,

    /// Generation timestamp
    pub generated_at: DateTime<Utc>,

    /// Source video path
    pub video_path: PathBuf,

    /// Video duration in seconds
    pub duration: f64,

    /// Overview summary
    #[serde(default)]
    pub summary: String,

    /// Aggregated key points across sections
    #[serde(default)]
    pub key_points: Vec<String>,

    /// Detected scenes
    #[serde(default)]
    pub scenes: Vec<Scene>,

    /// Transcript sections
    #[serde(default)]
    pub sections: Vec<Section>,

    /// Full transcript text
    #[serde(default)]
    pub full_transcript: String,

    /// Source metadata map
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Report {
    /// Render the report as plain text, for the on-demand converter.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();
        lines.push("=".repeat(80));
        lines.push(format!("{:^80}", self.title));
        lines.push("=".repeat(80));
        lines.push(String::new());
        lines.push(format!("Date: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S")));
        lines.push(format!(
            "Video: {}",
            self.video_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.video_path.display().to_string())
        ));
        lines.push(format!("Duration: {}", format_readable(self.duration)));
        lines.push(String::new());

        lines.push("SUMMARY".to_string());
        lines.push("-".repeat(80));
        lines.push(self.summary.clone());
        lines.push(String::new());

        if !self.key_points.is_empty() {
            lines.push("KEY POINTS".to_string());
            lines.push("-".repeat(80));
            for (i, point) in self.key_points.iter().enumerate() {
                lines.push(format!("{}. {}", i + 1, point));
            }
            lines.push(String::new());
        }

        lines.push("SCENE BREAKDOWN".to_string());
        lines.push("-".repeat(80));
        for scene in &self.scenes {
            lines.push(format!(
                "Scene {}: {} - {}",
                scene.number,
                format_hms(scene.start_time),
                format_hms(scene.end_time.unwrap_or(self.duration)),
            ));
            if !scene.description.is_empty() {
                lines.push(format!("  Description: {}", scene.description));
            }
        }
        lines.push(String::new());

        lines.push("TRANSCRIPT".to_string());
        lines.push("-".repeat(80));
        for section in &self.sections {
            lines.push(format!(
                "\n[{} - {}]",
                format_hms(section.start_time),
                format_hms(section.end_time)
            ));
            lines.push(section.text());
        }

        lines.join("\n")
    }
}

/// The orchestrator's single terminal return value.
///
/// Once this exists, ownership of the on-disk artifacts passes to the
/// caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Whether every stage completed
    pub success: bool,

    /// Session directory (populated best-effort even on failure)
    pub output_dir: PathBuf,

    /// Burned-in video, when rendering ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captioned_video_path: Option<PathBuf>,

    /// Exported report files keyed by format
    #[serde(default)]
    pub report_paths: BTreeMap<String, PathBuf>,

    /// Failure message naming the failed stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineResult {
    /// Successful terminal result.
    pub fn completed(
        output_dir: PathBuf,
        captioned_video_path: Option<PathBuf>,
        report_paths: BTreeMap<String, PathBuf>,
    ) -> Self {
        Self {
            success: true,
            output_dir,
            captioned_video_path,
            report_paths,
            error: None,
        }
    }

    /// Failed terminal result; the partial output directory is preserved.
    pub fn failed(output_dir: PathBuf, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output_dir,
            captioned_video_path: None,
            report_paths: BTreeMap::new(),
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_keeps_output_dir() {
        let result = PipelineResult::failed(PathBuf::from("/tmp/session"), "Transcribing: boom");
        assert!(!result.success);
        assert_eq!(result.output_dir, PathBuf::from("/tmp/session"));
        assert_eq!(result.error.as_deref(), Some("Transcribing: boom"));
    }

    #[test]
    fn test_report_text_contains_sections() {
        let report = Report {
            title: "Meeting Report - standup".to_string(),
            generated_at: Utc::now(),
            video_path: PathBuf::from("/videos/standup.mp4"),
            duration: 60.0,
            summary: "One minute of standup.".to_string(),
            key_points: vec!["Ship it".to_string()],
            scenes: Vec::new(),
            sections: Vec::new(),
            full_transcript: String::new(),
            metadata: BTreeMap::new(),
        };

        let text = report.to_text();
        assert!(text.contains("Meeting Report - standup"));
        assert!(text.contains("KEY POINTS"));
        assert!(text.contains("1. Ship it"));
        assert!(text.contains("Duration: 1 minute"));
    }
}
