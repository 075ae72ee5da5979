//! Shared data models for the MeetCap pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs and their status snapshots
//! - Detected scenes and transcript fragments/sections
//! - Captions and the master report payload
//! - Timecode formatting for subtitles and reports

pub mod caption;
pub mod job;
pub mod report;
pub mod scene;
pub mod timecode;
pub mod transcript;
pub mod video;

// Re-export common types
pub use caption::Caption;
pub use job::{JobId, JobOutput, JobRecord, JobStatus};
pub use report::{PipelineResult, Report};
pub use scene::Scene;
pub use transcript::{Section, TranscriptFragment};
pub use video::VideoMetadata;
