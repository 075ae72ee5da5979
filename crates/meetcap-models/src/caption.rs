//! Caption records for subtitle rendering.

use serde::{Deserialize, Serialize};

use crate::transcript::TranscriptFragment;

/// A single subtitle entry, one per transcript fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// 1-based, contiguous index
    pub index: u32,

    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds
    pub end_time: f64,

    /// Caption text
    pub text: String,
}

impl Caption {
    /// Build the caption sequence for a fragment stream, indices 1..=n.
    pub fn from_fragments(fragments: &[TranscriptFragment]) -> Vec<Caption> {
        fragments
            .iter()
            .enumerate()
            .map(|(i, fragment)| Caption {
                index: i as u32 + 1,
                start_time: fragment.start_time,
                end_time: fragment.end_time,
                text: fragment.text.trim().to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_one_based_and_contiguous() {
        let fragments = vec![
            TranscriptFragment {
                id: 0,
                start_time: 0.0,
                end_time: 2.0,
                text: "first".to_string(),
                confidence: 0.9,
            },
            TranscriptFragment {
                id: 1,
                start_time: 2.0,
                end_time: 4.5,
                text: " second ".to_string(),
                confidence: 0.8,
            },
        ];

        let captions = Caption::from_fragments(&fragments);
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].index, 1);
        assert_eq!(captions[1].index, 2);
        assert_eq!(captions[1].text, "second");
    }

    #[test]
    fn test_empty_fragments_yield_no_captions() {
        assert!(Caption::from_fragments(&[]).is_empty());
    }
}
