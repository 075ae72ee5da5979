//! Video metadata.

use serde::{Deserialize, Serialize};

/// Basic metadata for a resolved source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Duration in seconds
    pub duration: f64,
    /// Frame rate (fps)
    pub fps: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Total frame count
    pub frame_count: u64,
    /// Whether an audio stream is present
    pub has_audio: bool,
    /// File size in bytes
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_serde_roundtrip() {
        let meta = VideoMetadata {
            duration: 120.5,
            fps: 30.0,
            width: 1920,
            height: 1080,
            frame_count: 3615,
            has_audio: true,
            size_bytes: 1024,
        };

        let json = serde_json::to_string(&meta).unwrap();
        let back: VideoMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
