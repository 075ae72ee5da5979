//! Source video resolution.
//!
//! Resolving remote sources (URLs, cloud shares, streaming platforms) is a
//! collaborator concern; the pipeline only depends on this interface. The
//! shipped implementation handles local files.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PipelineError, StageResult};
use meetcap_models::VideoMetadata;

/// Container formats the pipeline accepts.
const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "flv", "wmv", "webm"];

/// Resolves a source reference to a local file plus basic metadata.
#[async_trait]
pub trait VideoLoader: Send + Sync {
    async fn load(&self, source: &str) -> StageResult<(PathBuf, VideoMetadata)>;
}

/// Loader for videos already on the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileLoader;

#[async_trait]
impl VideoLoader for FileLoader {
    async fn load(&self, source: &str) -> StageResult<(PathBuf, VideoMetadata)> {
        if source.starts_with("http://") || source.starts_with("https://") {
            return Err(PipelineError::load_failed(format!(
                "unsupported source '{}': remote sources need a download collaborator",
                source
            )));
        }

        let path = PathBuf::from(source);
        if !path.exists() {
            return Err(PipelineError::load_failed(format!(
                "video file not found: {}",
                path.display()
            )));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext) => {}
            other => {
                return Err(PipelineError::load_failed(format!(
                    "unsupported video format: {:?}",
                    other.unwrap_or("<none>")
                )));
            }
        }

        let metadata = meetcap_media::probe_video(&path)
            .await
            .map_err(|e| PipelineError::load_failed(e.to_string()))?;

        info!(
            "Video loaded: {} ({:.1}s, {}x{}, {:.1} fps, audio={})",
            display_name(&path),
            metadata.duration,
            metadata.width,
            metadata.height,
            metadata.fps,
            if metadata.has_audio { "yes" } else { "no" }
        );

        Ok((path, metadata))
    }
}

/// Filename portion of a path, for log lines.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remote_source_is_rejected() {
        let result = FileLoader.load("https://example.com/video.mp4").await;
        assert!(matches!(result, Err(PipelineError::LoadFailed(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_rejected() {
        let result = FileLoader.load("/nonexistent/meeting.mp4").await;
        assert!(matches!(result, Err(PipelineError::LoadFailed(_))));
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"not a video").unwrap();

        let result = FileLoader.load(path.to_str().unwrap()).await;
        assert!(matches!(result, Err(PipelineError::LoadFailed(_))));
    }
}
