//! Session output directory management.
//!
//! Each job owns one timestamped session directory with fixed
//! subdirectories for videos, reports, frames, captions and audio. The
//! directory is created before the first stage runs so even an early
//! failure leaves a populated output location behind.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{PipelineError, StageResult};
use meetcap_media::error::{MediaError, MediaResult};
use meetcap_media::{Frame, FrameSink};

/// Fixed artifact layout under one session directory.
#[derive(Debug, Clone)]
pub struct SessionDirs {
    root: PathBuf,
}

impl SessionDirs {
    /// Create a fresh session directory under `output_root`.
    pub fn create(output_root: &Path, session_name: Option<&str>) -> StageResult<Self> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let name = match session_name {
            Some(name) => format!("{}_{}", name, timestamp),
            None => format!("session_{}", timestamp),
        };

        let dirs = Self {
            root: output_root.join(name),
        };
        dirs.create_directories()?;

        info!("Session directory: {}", dirs.root.display());
        Ok(dirs)
    }

    /// Re-open an existing session directory, creating missing subdirs.
    pub fn at(root: PathBuf) -> StageResult<Self> {
        let dirs = Self { root };
        dirs.create_directories()?;
        Ok(dirs)
    }

    fn create_directories(&self) -> StageResult<()> {
        for dir in [
            self.videos_dir(),
            self.reports_dir(),
            self.frames_dir(),
            self.captions_dir(),
            self.audio_dir(),
        ] {
            std::fs::create_dir_all(&dir)?;
            debug!("Created directory: {}", dir.display());
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.root.join("videos")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.root.join("frames")
    }

    pub fn captions_dir(&self) -> PathBuf {
        self.root.join("captions")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.root.join("audio")
    }

    pub fn audio_path(&self) -> PathBuf {
        self.audio_dir().join("audio.wav")
    }

    pub fn transcript_path(&self) -> PathBuf {
        self.audio_dir().join("transcript.txt")
    }

    pub fn caption_path(&self, format: &str) -> PathBuf {
        self.captions_dir().join(format!("captions.{}", format))
    }

    pub fn report_path(&self, stem: &str, format: &str) -> PathBuf {
        self.reports_dir().join(format!("{}.{}", stem, format))
    }

    pub fn frame_path(&self, frame_number: u64, timestamp: f64) -> PathBuf {
        self.frames_dir()
            .join(format!("frame_{:06}_t{:.2}.jpg", frame_number, timestamp))
    }

    /// Write a manifest listing every file the session produced.
    pub fn write_manifest(&self) -> StageResult<PathBuf> {
        let mut files = Vec::new();
        collect_files(&self.root, &self.root, &mut files)?;
        files.sort();

        let manifest = serde_json::json!({
            "created_at": Utc::now().to_rfc3339(),
            "session_dir": self.root.display().to_string(),
            "files": files,
        });

        let path = self.root.join("manifest.json");
        let body = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| PipelineError::report_failed(e.to_string()))?;
        std::fs::write(&path, body)?;
        Ok(path)
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            out.push(relative.display().to_string());
        }
    }
    Ok(())
}

/// Persists representative scene frames as JPEG under `frames/`.
pub struct SessionFrameSink {
    frames_dir: PathBuf,
}

impl SessionFrameSink {
    pub fn new(frames_dir: PathBuf) -> Self {
        Self { frames_dir }
    }
}

impl FrameSink for SessionFrameSink {
    fn save(&mut self, frame: &Frame) -> MediaResult<PathBuf> {
        let path = self.frames_dir.join(format!(
            "frame_{:06}_t{:.2}.jpg",
            frame.index, frame.timestamp
        ));

        let img = image::RgbImage::from_raw(frame.width, frame.height, frame.rgb.clone())
            .ok_or_else(|| MediaError::frame_decode("frame buffer size mismatch"))?;
        img.save(&path)
            .map_err(|e| MediaError::frame_decode(e.to_string()))?;

        Ok(path)
    }
}
