//! Report building and JSON export.
//!
//! The JSON master report is the single serialized source of truth;
//! other formats are produced on demand by an external renderer.

use chrono::Utc;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PipelineError, StageResult};
use crate::loader::display_name;
use meetcap_models::{Report, Scene, Section, VideoMetadata};

/// How many aggregated key points the report keeps.
const MAX_REPORT_KEY_POINTS: usize = 10;

/// Builds the structured report from processing results.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder;

impl ReportBuilder {
    pub fn build(
        &self,
        video_path: &Path,
        metadata: &VideoMetadata,
        scenes: Vec<Scene>,
        sections: Vec<Section>,
        full_transcript: String,
    ) -> Report {
        let stem = video_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());

        let summary = format!(
            "Meeting video analyzed: {}\nDuration: {:.1} minutes\nScenes detected: {}\nTranscript sections: {}\n",
            display_name(video_path),
            metadata.duration / 60.0,
            scenes.len(),
            sections.len(),
        );

        let mut key_points: Vec<String> = sections
            .iter()
            .flat_map(|s| s.key_points.iter().cloned())
            .collect();
        key_points.truncate(MAX_REPORT_KEY_POINTS);

        let mut meta_map = BTreeMap::new();
        meta_map.insert("duration".to_string(), serde_json::json!(metadata.duration));
        meta_map.insert("fps".to_string(), serde_json::json!(metadata.fps));
        meta_map.insert("width".to_string(), serde_json::json!(metadata.width));
        meta_map.insert("height".to_string(), serde_json::json!(metadata.height));
        meta_map.insert(
            "frame_count".to_string(),
            serde_json::json!(metadata.frame_count),
        );
        meta_map.insert("has_audio".to_string(), serde_json::json!(metadata.has_audio));
        meta_map.insert(
            "size_bytes".to_string(),
            serde_json::json!(metadata.size_bytes),
        );

        info!(
            "Report built: {} scenes, {} sections, {} transcript chars",
            scenes.len(),
            sections.len(),
            full_transcript.len()
        );

        Report {
            title: format!("Meeting Report - {}", stem),
            generated_at: Utc::now(),
            video_path: video_path.to_path_buf(),
            duration: metadata.duration,
            summary,
            key_points,
            scenes,
            sections,
            full_transcript,
            metadata: meta_map,
        }
    }

    /// Export the report as pretty-printed JSON.
    pub async fn export_json(&self, report: &Report, output_path: &Path) -> StageResult<PathBuf> {
        let body = serde_json::to_vec_pretty(report)
            .map_err(|e| PipelineError::report_failed(format!("serialization failed: {}", e)))?;

        tokio::fs::write(output_path, body)
            .await
            .map_err(|e| {
                PipelineError::report_failed(format!(
                    "failed to write {}: {}",
                    output_path.display(),
                    e
                ))
            })?;

        info!("Report exported: {}", output_path.display());
        Ok(output_path.to_path_buf())
    }
}
