//! Media adapter seam.
//!
//! Keeps subprocess integration swappable and separate from the pipeline's
//! control flow: the orchestrator talks to this trait, the FFmpeg-backed
//! implementation lives behind it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::session::SessionFrameSink;
use meetcap_media::error::{MediaError, MediaResult};
use meetcap_media::{burn_in, extract_audio, FrameSink, FrameStream, SceneDetector};
use meetcap_models::{Scene, VideoMetadata};

/// External media operations used by the pipeline stages.
#[async_trait]
pub trait MediaAdapter: Send + Sync {
    /// Extract the audio track as mono 16 kHz WAV.
    async fn extract_audio(&self, video: &Path, output: &Path) -> MediaResult<()>;

    /// Scan the video for scene boundaries, persisting representative
    /// frames under `frames_dir` when given.
    async fn detect_scenes(
        &self,
        video: &Path,
        metadata: &VideoMetadata,
        frames_dir: Option<&Path>,
    ) -> MediaResult<Vec<Scene>>;

    /// Burn a subtitle payload into the video; returns the sanitized
    /// output path.
    async fn burn_in(
        &self,
        video: &Path,
        subtitle_bytes: &[u8],
        requested_name: &str,
        output_dir: &Path,
    ) -> MediaResult<PathBuf>;
}

/// FFmpeg-backed adapter.
#[derive(Debug, Clone)]
pub struct FfmpegAdapter {
    scene_threshold: f64,
    min_scene_duration: f64,
    scan_fps: f64,
}

impl FfmpegAdapter {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            scene_threshold: config.scene_threshold,
            min_scene_duration: config.min_scene_duration,
            scan_fps: config.scan_fps,
        }
    }
}

#[async_trait]
impl MediaAdapter for FfmpegAdapter {
    async fn extract_audio(&self, video: &Path, output: &Path) -> MediaResult<()> {
        extract_audio(video, output).await
    }

    async fn detect_scenes(
        &self,
        video: &Path,
        metadata: &VideoMetadata,
        frames_dir: Option<&Path>,
    ) -> MediaResult<Vec<Scene>> {
        let video = video.to_path_buf();
        let frames_dir = frames_dir.map(Path::to_path_buf);
        let (width, height, duration) = (metadata.width, metadata.height, metadata.duration);
        let detector = SceneDetector::new(self.scene_threshold, self.min_scene_duration);
        let scan_fps = self.scan_fps;

        // The scan is a blocking decode loop over the whole video
        tokio::task::spawn_blocking(move || {
            let stream = FrameStream::open(&video, width, height, scan_fps)?;
            let mut sink = frames_dir.map(SessionFrameSink::new);
            let sink_ref = sink.as_mut().map(|s| s as &mut dyn FrameSink);
            detector.detect_scenes(stream, duration, sink_ref)
        })
        .await
        .map_err(|e| MediaError::frame_decode(format!("scene scan task failed: {}", e)))?
    }

    async fn burn_in(
        &self,
        video: &Path,
        subtitle_bytes: &[u8],
        requested_name: &str,
        output_dir: &Path,
    ) -> MediaResult<PathBuf> {
        burn_in(video, subtitle_bytes, requested_name, output_dir).await
    }
}
