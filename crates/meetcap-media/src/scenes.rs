//! Scene boundary detection.
//!
//! Scans a frame stream, applies the difference scorer at a
//! minimum-duration cadence, and emits ordered, contiguous scenes covering
//! the whole video.

use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::MediaResult;
use crate::frame::Frame;
use crate::scoring::FrameDifferenceScorer;
use meetcap_models::Scene;

/// Interval between scan-progress log lines, in frames.
const PROGRESS_LOG_INTERVAL: u64 = 300;

/// Persists a representative frame for a scene boundary.
///
/// Persistence failure never aborts detection; the scene simply records no
/// frame path.
pub trait FrameSink {
    fn save(&mut self, frame: &Frame) -> MediaResult<PathBuf>;
}

/// Detects scene changes and content transitions in a frame stream.
pub struct SceneDetector {
    scorer: FrameDifferenceScorer,
    /// Sensitivity threshold for declaring a boundary (0-100)
    threshold: f64,
    /// Minimum time between boundaries, in seconds
    min_scene_duration: f64,
}

impl SceneDetector {
    pub fn new(threshold: f64, min_scene_duration: f64) -> Self {
        Self {
            scorer: FrameDifferenceScorer::default(),
            threshold,
            min_scene_duration,
        }
    }

    pub fn with_scorer(mut self, scorer: FrameDifferenceScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Scan the frame stream and return contiguous, ordered scenes.
    ///
    /// Scenes are kept as drafts with open end fields while scanning and
    /// closed by list position when the next boundary arrives; a final pass
    /// closes the last scene at `duration`. The first frame never triggers
    /// a boundary, and a stream with no boundaries yields one scene
    /// spanning the whole video.
    pub fn detect_scenes<I>(
        &self,
        frames: I,
        duration: f64,
        mut sink: Option<&mut dyn FrameSink>,
    ) -> MediaResult<Vec<Scene>>
    where
        I: IntoIterator<Item = MediaResult<Frame>>,
    {
        let mut scenes: Vec<Scene> = Vec::new();
        let mut prev: Option<Frame> = None;
        let mut last_boundary = 0.0_f64;
        let mut last_frame_index = 0_u64;
        let mut frame_count = 0_u64;

        for item in frames {
            let frame = item?;
            let t = frame.timestamp;

            match prev {
                None => {
                    // Opening scene always starts at zero
                    scenes.push(Scene::open(1, 0.0, frame.index, 0.0));
                }
                Some(ref previous) if t - last_boundary >= self.min_scene_duration => {
                    let score = self.scorer.score(previous, &frame);
                    if score > self.threshold {
                        if let Some(open) = scenes.last_mut() {
                            open.end_time = Some(t);
                            open.end_frame = Some(frame.index);
                        }

                        let mut scene =
                            Scene::open(scenes.len() as u32 + 1, t, frame.index, score);
                        scene.frame_path = persist_frame(sink.as_deref_mut(), &frame);
                        debug!(
                            "Scene {} detected at {:.2}s (score: {:.2})",
                            scene.number, t, score
                        );
                        scenes.push(scene);
                        last_boundary = t;
                    }
                }
                Some(_) => {}
            }

            last_frame_index = frame.index;
            frame_count += 1;
            if frame_count % PROGRESS_LOG_INTERVAL == 0 {
                debug!("Scene scan at {:.1}s, {} scenes so far", t, scenes.len());
            }
            prev = Some(frame);
        }

        if frame_count == 0 {
            // Nothing decoded; the whole video is one scene
            let mut scene = Scene::open(1, 0.0, 0, 0.0);
            scene.end_time = Some(duration);
            scene.end_frame = Some(0);
            scene.description = "No frames decoded".to_string();
            return Ok(vec![scene]);
        }

        // Close the final open scene at the end of the stream
        if let Some(last) = scenes.last_mut() {
            last.end_time = Some(duration);
            last.end_frame = Some(last_frame_index);
        }

        if scenes.len() == 1 {
            scenes[0].description = "No scene changes detected".to_string();
        }

        debug!("Scene detection complete: {} scenes", scenes.len());
        Ok(scenes)
    }
}

fn persist_frame(sink: Option<&mut (dyn FrameSink + '_)>, frame: &Frame) -> Option<PathBuf> {
    let sink = sink?;
    match sink.save(frame) {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(
                "Failed to persist representative frame {}: {}",
                frame.index, e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;

    const W: u32 = 32;
    const H: u32 = 32;

    /// Gradient frame with a per-frame base offset; offsets far apart look
    /// like different content.
    fn frame_at(index: u64, fps: f64, base: u8) -> Frame {
        let mut rgb = Vec::with_capacity((W * H * 3) as usize);
        for y in 0..H {
            for x in 0..W {
                let v = base.wrapping_add(((x + y) % 64) as u8);
                rgb.extend_from_slice(&[v, v, v]);
            }
        }
        Frame::new(index, index as f64 / fps, W, H, rgb)
    }

    fn stream(bases: &[u8], fps: f64) -> Vec<MediaResult<Frame>> {
        bases
            .iter()
            .enumerate()
            .map(|(i, &b)| Ok(frame_at(i as u64, fps, b)))
            .collect()
    }

    struct FailingSink;

    impl FrameSink for FailingSink {
        fn save(&mut self, _frame: &Frame) -> MediaResult<PathBuf> {
            Err(MediaError::frame_decode("disk full"))
        }
    }

    struct RecordingSink(Vec<u64>);

    impl FrameSink for RecordingSink {
        fn save(&mut self, frame: &Frame) -> MediaResult<PathBuf> {
            self.0.push(frame.index);
            Ok(PathBuf::from(format!("/frames/{:06}.jpg", frame.index)))
        }
    }

    fn assert_contiguous(scenes: &[Scene], duration: f64) {
        assert!(!scenes.is_empty());
        assert_eq!(scenes[0].start_time, 0.0);
        for pair in scenes.windows(2) {
            assert_eq!(pair[0].end_time, Some(pair[1].start_time));
        }
        assert_eq!(scenes.last().unwrap().end_time, Some(duration));
        for (i, scene) in scenes.iter().enumerate() {
            assert_eq!(scene.number, i as u32 + 1);
        }
    }

    #[test]
    fn test_single_cut_produces_two_contiguous_scenes() {
        // 1 fps, content switches at t=5
        let bases = [10, 10, 10, 10, 10, 200, 200, 200, 200, 200];
        let detector = SceneDetector::new(30.0, 1.0);
        let scenes = detector
            .detect_scenes(stream(&bases, 1.0), 10.0, None)
            .unwrap();

        assert_eq!(scenes.len(), 2);
        assert_contiguous(&scenes, 10.0);
        assert_eq!(scenes[1].start_time, 5.0);
        assert_eq!(scenes[1].start_frame, 5);
        assert!(scenes[1].change_score > 30.0);
    }

    #[test]
    fn test_stable_stream_is_one_scene() {
        let bases = [42u8; 8];
        let detector = SceneDetector::new(30.0, 1.0);
        let scenes = detector
            .detect_scenes(stream(&bases, 1.0), 8.0, None)
            .unwrap();

        assert_eq!(scenes.len(), 1);
        assert_contiguous(&scenes, 8.0);
        assert_eq!(scenes[0].description, "No scene changes detected");
    }

    #[test]
    fn test_min_duration_suppresses_rapid_boundaries() {
        // Content flips every second, but boundaries need 3s spacing
        let bases = [10, 200, 10, 200, 10, 200, 10, 200, 10, 200];
        let detector = SceneDetector::new(30.0, 3.0);
        let scenes = detector
            .detect_scenes(stream(&bases, 1.0), 10.0, None)
            .unwrap();

        assert_contiguous(&scenes, 10.0);
        for pair in scenes.windows(2) {
            assert!(pair[1].start_time - pair[0].start_time >= 3.0);
        }
    }

    #[test]
    fn test_first_frame_never_a_boundary() {
        let bases = [10, 10, 10];
        let detector = SceneDetector::new(0.0, 0.0);
        let scenes = detector
            .detect_scenes(stream(&bases, 1.0), 3.0, None)
            .unwrap();
        assert_eq!(scenes[0].start_time, 0.0);
        assert_eq!(scenes[0].change_score, 0.0);
    }

    #[test]
    fn test_empty_stream_spans_whole_duration() {
        let detector = SceneDetector::new(30.0, 1.0);
        let scenes = detector.detect_scenes(Vec::new(), 42.0, None).unwrap();

        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].start_time, 0.0);
        assert_eq!(scenes[0].end_time, Some(42.0));
    }

    #[test]
    fn test_sink_failure_is_absorbed() {
        let bases = [10, 10, 10, 200, 200, 200];
        let detector = SceneDetector::new(30.0, 1.0);
        let mut sink = FailingSink;
        let scenes = detector
            .detect_scenes(stream(&bases, 1.0), 6.0, Some(&mut sink))
            .unwrap();

        assert_eq!(scenes.len(), 2);
        assert!(scenes[1].frame_path.is_none());
        assert_contiguous(&scenes, 6.0);
    }

    #[test]
    fn test_sink_records_boundary_frames() {
        let bases = [10, 10, 10, 200, 200, 200];
        let detector = SceneDetector::new(30.0, 1.0);
        let mut sink = RecordingSink(Vec::new());
        let scenes = detector
            .detect_scenes(stream(&bases, 1.0), 6.0, Some(&mut sink))
            .unwrap();

        assert_eq!(sink.0, vec![3]);
        assert_eq!(
            scenes[1].frame_path.as_deref(),
            Some(std::path::Path::new("/frames/000003.jpg"))
        );
    }

    #[test]
    fn test_decode_error_propagates() {
        let mut frames = stream(&[10, 10], 1.0);
        frames.push(Err(MediaError::frame_decode("bad packet")));

        let detector = SceneDetector::new(30.0, 1.0);
        let result = detector.detect_scenes(frames, 3.0, None);
        assert!(matches!(result, Err(MediaError::FrameDecode(_))));
    }
}
