//! Staged captioning pipeline.
//!
//! One job = one complete video, processed front to back: load, extract
//! audio + detect scenes, transcribe, segment, caption, optionally burn
//! subtitles in, report, export, finalize. Jobs run as independent
//! background tasks and publish status snapshots through the
//! [`JobRegistry`].

pub mod adapter;
pub mod config;
pub mod error;
pub mod loader;
pub mod orchestrator;
pub mod registry;
pub mod report;
pub mod segmenter;
pub mod session;
pub mod summarizer;
pub mod transcriber;

pub use adapter::{FfmpegAdapter, MediaAdapter};
pub use config::PipelineConfig;
pub use error::{PipelineError, StageResult};
pub use loader::{FileLoader, VideoLoader};
pub use orchestrator::{PipelineOrchestrator, Stage};
pub use registry::JobRegistry;
pub use report::ReportBuilder;
pub use segmenter::TranscriptSegmenter;
pub use session::{SessionDirs, SessionFrameSink};
pub use summarizer::{ModelClient, SectionSummarizer};
pub use transcriber::{Transcriber, WhisperCliTranscriber};
