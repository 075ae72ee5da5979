#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper and visual analysis for meeting videos.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with a pinnable working directory
//! - FFprobe metadata extraction
//! - Audio track extraction for transcription
//! - Raw frame streaming and frame-difference scoring
//! - Scene boundary detection
//! - Subtitle rendering and burn-in

pub mod audio;
pub mod command;
pub mod error;
pub mod frame;
pub mod probe;
pub mod scenes;
pub mod scoring;
pub mod subtitles;

pub use audio::extract_audio;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use frame::{Frame, FrameStream};
pub use probe::probe_video;
pub use scenes::{FrameSink, SceneDetector};
pub use scoring::{FrameDifferenceScorer, ScorerConfig};
pub use subtitles::{burn_in, render_srt, sanitize_file_name};
