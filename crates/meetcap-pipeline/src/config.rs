//! Pipeline configuration.

use std::path::PathBuf;

/// Pipeline configuration, loaded from the environment with defaults.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root directory for session outputs
    pub output_dir: PathBuf,
    /// Scene boundary threshold (0-100)
    pub scene_threshold: f64,
    /// Minimum time between scene boundaries, seconds
    pub min_scene_duration: f64,
    /// Frame sampling rate for the scene scan, fps
    pub scan_fps: f64,
    /// Silence gap that closes a transcript section, seconds
    pub pause_threshold: f64,
    /// Maximum transcript section length, seconds
    pub max_section_duration: f64,
    /// Key points extracted per section
    pub max_key_points: usize,
    /// Whether to burn captions into the video
    pub burn_captions: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            scene_threshold: 30.0,
            min_scene_duration: 1.0,
            scan_fps: 5.0,
            pause_threshold: 2.0,
            max_section_duration: 300.0,
            max_key_points: 5,
            burn_captions: true,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            output_dir: std::env::var("MEETCAP_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            scene_threshold: env_parse("MEETCAP_SCENE_THRESHOLD", defaults.scene_threshold),
            min_scene_duration: env_parse("MEETCAP_SCENE_MIN_DURATION", defaults.min_scene_duration),
            scan_fps: env_parse("MEETCAP_SCAN_FPS", defaults.scan_fps),
            pause_threshold: env_parse("MEETCAP_PAUSE_THRESHOLD", defaults.pause_threshold),
            max_section_duration: env_parse(
                "MEETCAP_MAX_SECTION_DURATION",
                defaults.max_section_duration,
            ),
            max_key_points: env_parse("MEETCAP_MAX_KEY_POINTS", defaults.max_key_points),
            burn_captions: env_parse("MEETCAP_BURN_CAPTIONS", defaults.burn_captions),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.scene_threshold, 30.0);
        assert_eq!(config.min_scene_duration, 1.0);
        assert_eq!(config.pause_threshold, 2.0);
        assert_eq!(config.max_section_duration, 300.0);
        assert_eq!(config.max_key_points, 5);
        assert!(config.burn_captions);
    }
}
