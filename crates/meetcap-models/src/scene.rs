//! Detected scene records.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A maximal interval of visually stable content.
///
/// Scenes are built incrementally while scanning: the end fields stay `None`
/// until the next boundary (or the end of the stream) closes the record.
/// A finished detection pass always yields a contiguous, ordered sequence
/// covering the whole video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Sequential scene number, 1-based
    pub number: u32,

    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds (`None` while the scene is still open)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,

    /// First frame index of the scene
    pub start_frame: u64,

    /// Last frame index (`None` while open)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_frame: Option<u64>,

    /// Persisted representative frame, when one was saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_path: Option<PathBuf>,

    /// Magnitude of the visual change that opened this scene (0-100)
    pub change_score: f64,

    /// Optional scene description
    #[serde(default)]
    pub description: String,
}

impl Scene {
    /// Open a new scene at the given boundary.
    pub fn open(number: u32, start_time: f64, start_frame: u64, change_score: f64) -> Self {
        Self {
            number,
            start_time,
            end_time: None,
            start_frame,
            end_frame: None,
            frame_path: None,
            change_score,
            description: String::new(),
        }
    }

    /// Scene duration in seconds, once closed.
    pub fn duration(&self) -> Option<f64> {
        self.end_time.map(|end| end - self.start_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_scene_has_no_end() {
        let scene = Scene::open(1, 0.0, 0, 0.0);
        assert!(scene.end_time.is_none());
        assert!(scene.duration().is_none());
    }

    #[test]
    fn test_duration_of_closed_scene() {
        let mut scene = Scene::open(2, 10.0, 300, 57.5);
        scene.end_time = Some(25.0);
        scene.end_frame = Some(750);
        assert_eq!(scene.duration(), Some(15.0));
    }
}
