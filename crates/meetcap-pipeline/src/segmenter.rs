//! Transcript segmentation.
//!
//! Groups the flat fragment stream into topical sections using pause and
//! duration rules. The output partitions the input exactly: every fragment
//! lands in one section, in original order.

use tracing::debug;

use meetcap_models::{Section, TranscriptFragment};

/// Groups ordered fragments into bounded sections.
#[derive(Debug, Clone)]
pub struct TranscriptSegmenter {
    /// Silence gap that closes the current section, seconds
    pause_threshold: f64,
    /// Maximum section length, seconds
    max_section_duration: f64,
}

impl TranscriptSegmenter {
    pub fn new(pause_threshold: f64, max_section_duration: f64) -> Self {
        Self {
            pause_threshold,
            max_section_duration,
        }
    }

    /// Segment the fragment stream by pauses and duration.
    ///
    /// After appending fragment `i`, the section closes when the gap to
    /// fragment `i+1` reaches the pause threshold, when the elapsed section
    /// duration reaches the maximum, or when `i` is the last fragment.
    pub fn segment_by_pauses(&self, fragments: &[TranscriptFragment]) -> Vec<Section> {
        if fragments.is_empty() {
            return Vec::new();
        }

        let mut sections: Vec<Section> = Vec::new();
        let mut current: Vec<TranscriptFragment> = Vec::new();
        let mut section_start = fragments[0].start_time;

        for (i, fragment) in fragments.iter().enumerate() {
            current.push(fragment.clone());

            let mut should_break = false;

            if let Some(next) = fragments.get(i + 1) {
                let pause = next.start_time - fragment.end_time;
                if pause >= self.pause_threshold {
                    should_break = true;
                }
            }

            if fragment.end_time - section_start >= self.max_section_duration {
                should_break = true;
            }

            let is_last = i + 1 == fragments.len();
            if should_break || is_last {
                let end_time = current.last().map(|f| f.end_time).unwrap_or(section_start);
                sections.push(Section {
                    number: sections.len() as u32 + 1,
                    start_time: section_start,
                    end_time,
                    fragments: std::mem::take(&mut current),
                    summary: String::new(),
                    key_points: Vec::new(),
                });

                if let Some(next) = fragments.get(i + 1) {
                    section_start = next.start_time;
                }
            }
        }

        debug!(
            "Segmented {} fragments into {} sections",
            fragments.len(),
            sections.len()
        );
        sections
    }
}
