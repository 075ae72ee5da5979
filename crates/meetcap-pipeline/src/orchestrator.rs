//! Pipeline orchestration.
//!
//! Sequences load, extract + scene detection, transcription, segmentation,
//! captioning, optional burn-in, reporting, export and finalize for one
//! job. Strictly sequential, no retries: the first stage failure maps to
//! one terminal outcome and the partial output directory is preserved.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::adapter::MediaAdapter;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::loader::{display_name, VideoLoader};
use crate::registry::JobRegistry;
use crate::report::ReportBuilder;
use crate::segmenter::TranscriptSegmenter;
use crate::session::SessionDirs;
use crate::summarizer::SectionSummarizer;
use crate::transcriber::Transcriber;
use meetcap_media::render_srt;
use meetcap_models::{Caption, JobId, JobOutput, JobStatus, PipelineResult};

/// Pipeline stages, entered strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Extracting,
    Transcribing,
    Segmenting,
    Captioning,
    Rendering,
    Reporting,
    Exporting,
    Finalizing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Loading => "loading",
            Stage::Extracting => "extracting",
            Stage::Transcribing => "transcribing",
            Stage::Segmenting => "segmenting",
            Stage::Captioning => "captioning",
            Stage::Rendering => "rendering",
            Stage::Reporting => "reporting",
            Stage::Exporting => "exporting",
            Stage::Finalizing => "finalizing",
        }
    }
}

/// Best-effort external progress observer.
pub type ProgressCallback = Arc<dyn Fn(u8, &str) + Send + Sync>;

/// Runs the staged pipeline for one job at a time.
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    loader: Arc<dyn VideoLoader>,
    transcriber: Arc<dyn Transcriber>,
    media: Arc<dyn MediaAdapter>,
    summarizer: SectionSummarizer,
    segmenter: TranscriptSegmenter,
    reporter: ReportBuilder,
    registry: JobRegistry,
    on_progress: Option<ProgressCallback>,
}

impl PipelineOrchestrator {
    pub fn new(
        config: PipelineConfig,
        loader: Arc<dyn VideoLoader>,
        transcriber: Arc<dyn Transcriber>,
        media: Arc<dyn MediaAdapter>,
        summarizer: SectionSummarizer,
        registry: JobRegistry,
    ) -> Self {
        let segmenter =
            TranscriptSegmenter::new(config.pause_threshold, config.max_section_duration);
        Self {
            config,
            loader,
            transcriber,
            media,
            summarizer,
            segmenter,
            reporter: ReportBuilder,
            registry,
            on_progress: None,
        }
    }

    /// Attach an external progress observer. Its failures are logged,
    /// never propagated.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Run the whole pipeline for one job and return the terminal result.
    pub async fn run_job(&self, job_id: &JobId, source: &str) -> PipelineResult {
        info!(job_id = %job_id, "Starting pipeline for: {}", source);
        self.registry.create_or_update(
            job_id,
            JobStatus::Processing,
            0,
            "Starting processing...",
            None,
        );

        let session = match SessionDirs::create(&self.config.output_dir, None) {
            Ok(session) => session,
            Err(e) => {
                let message = format!("Load failed: could not create output directory: {}", e);
                error!(job_id = %job_id, "{}", message);
                self.registry.fail(job_id, message.clone());
                return PipelineResult::failed(self.config.output_dir.clone(), message);
            }
        };

        match self.execute(job_id, source, &session).await {
            Ok((result, output)) => {
                self.registry.complete(job_id, output);
                info!(
                    job_id = %job_id,
                    "Pipeline completed, outputs in {}",
                    session.root().display()
                );
                result
            }
            Err(e) if e.is_cancelled() => {
                // The registry record was already flipped by the cancel
                // request; partial artifacts stay on disk.
                info!(job_id = %job_id, "Pipeline stopped at a stage boundary after cancellation");
                PipelineResult::failed(
                    session.root().to_path_buf(),
                    "Processing cancelled by user",
                )
            }
            Err(e) => {
                let message = e.to_string();
                error!(job_id = %job_id, "Pipeline failed: {}", message);
                self.registry.fail(job_id, message.clone());
                PipelineResult::failed(session.root().to_path_buf(), message)
            }
        }
    }

    async fn execute(
        &self,
        job_id: &JobId,
        source: &str,
        session: &SessionDirs,
    ) -> Result<(PipelineResult, JobOutput), PipelineError> {
        // Loading
        self.enter_stage(job_id, Stage::Loading)?;
        self.progress(job_id, 5, "Loading video...");
        let (video_path, metadata) = self.loader.load(source).await?;
        self.progress(
            job_id,
            10,
            &format!("Video loaded: {}", display_name(&video_path)),
        );

        // Extracting: audio and scene scan consume the same decoded video
        self.enter_stage(job_id, Stage::Extracting)?;
        self.progress(job_id, 15, "Processing video...");
        if !metadata.has_audio {
            return Err(PipelineError::extraction_failed(format!(
                "video has no audio track: {}",
                video_path.display()
            )));
        }
        let audio_path = session.audio_path();
        self.media
            .extract_audio(&video_path, &audio_path)
            .await
            .map_err(|e| PipelineError::extraction_failed(e.to_string()))?;
        let scenes = self
            .media
            .detect_scenes(&video_path, &metadata, Some(&session.frames_dir()))
            .await
            .map_err(|e| PipelineError::extraction_failed(e.to_string()))?;
        self.progress(job_id, 30, &format!("Detected {} scenes", scenes.len()));

        // Transcribing
        self.enter_stage(job_id, Stage::Transcribing)?;
        self.progress(job_id, 35, "Transcribing audio...");
        let fragments = self.transcriber.transcribe(&audio_path).await?;
        let full_transcript = fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        tokio::fs::write(session.transcript_path(), &full_transcript)
            .await
            .map_err(|e| {
                PipelineError::transcription_failed(format!("failed to write transcript: {}", e))
            })?;
        self.progress(
            job_id,
            50,
            &format!("Transcribed {} segments", fragments.len()),
        );

        // Segmenting
        self.enter_stage(job_id, Stage::Segmenting)?;
        self.progress(job_id, 55, "Segmenting transcript...");
        let mut sections = self.segmenter.segment_by_pauses(&fragments);
        for section in &mut sections {
            self.summarizer.enrich(section).await;
        }
        self.progress(job_id, 60, &format!("Created {} sections", sections.len()));

        // Captioning
        self.enter_stage(job_id, Stage::Captioning)?;
        self.progress(job_id, 65, "Generating captions...");
        let captions = Caption::from_fragments(&fragments);
        let srt_bytes = render_srt(&captions);
        let srt_path = session.caption_path("srt");
        tokio::fs::write(&srt_path, &srt_bytes).await.map_err(|e| {
            PipelineError::rendering_failed(format!("failed to write subtitle file: {}", e))
        })?;
        self.progress(job_id, 70, "Captions generated");

        // Rendering (optional)
        let mut captioned_video = None;
        if self.config.burn_captions {
            self.enter_stage(job_id, Stage::Rendering)?;
            self.progress(job_id, 75, "Burning captions into video...");
            let stem = video_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "video".to_string());
            let requested_name = format!("{}_captioned.mp4", stem);
            let path = self
                .media
                .burn_in(&video_path, &srt_bytes, &requested_name, &session.videos_dir())
                .await
                .map_err(|e| {
                    let diagnostic = e
                        .tool_stderr()
                        .map(|s| format!("{} ({})", e, s))
                        .unwrap_or_else(|| e.to_string());
                    PipelineError::rendering_failed(diagnostic)
                })?;
            captioned_video = Some(path);
            self.progress(job_id, 80, "Captioned video created");
        } else {
            self.progress(
                job_id,
                80,
                "Skipped caption burning (use the subtitle file for playback)",
            );
        }

        // Reporting
        self.enter_stage(job_id, Stage::Reporting)?;
        self.progress(job_id, 82, "Building report...");
        let scene_count = scenes.len();
        let section_count = sections.len();
        let report = self
            .reporter
            .build(&video_path, &metadata, scenes, sections, full_transcript);
        self.progress(job_id, 85, "Report built");

        // Exporting
        self.enter_stage(job_id, Stage::Exporting)?;
        self.progress(job_id, 88, "Exporting report...");
        let json_path = self
            .reporter
            .export_json(&report, &session.report_path("report", "json"))
            .await?;
        let mut report_paths = BTreeMap::new();
        report_paths.insert("json".to_string(), json_path);
        self.progress(job_id, 90, "Master report saved (JSON)");

        // Finalizing
        self.enter_stage(job_id, Stage::Finalizing)?;
        self.progress(job_id, 98, "Finalizing...");
        session
            .write_manifest()
            .map_err(|e| PipelineError::report_failed(format!("manifest: {}", e)))?;
        self.progress(job_id, 100, "Processing complete!");

        let result = PipelineResult::completed(
            session.root().to_path_buf(),
            captioned_video.clone(),
            report_paths.clone(),
        );
        let output = JobOutput {
            output_dir: session.root().to_path_buf(),
            captioned_video,
            caption_file: Some(srt_path),
            report_files: report_paths,
            scene_count,
            section_count,
            duration: metadata.duration,
        };
        Ok((result, output))
    }

    /// Stage boundary: the only place cancellation is observed.
    fn enter_stage(&self, job_id: &JobId, stage: Stage) -> Result<(), PipelineError> {
        if self.registry.is_cancelled(job_id) {
            info!(job_id = %job_id, stage = stage.as_str(), "Cancellation observed, stopping");
            return Err(PipelineError::Cancelled);
        }
        debug!(job_id = %job_id, stage = stage.as_str(), "Entering stage");
        Ok(())
    }

    /// Emit a progress update; registry write plus best-effort callback.
    fn progress(&self, job_id: &JobId, percent: u8, message: &str) {
        info!(job_id = %job_id, "Progress {}%: {}", percent, message);
        self.registry
            .create_or_update(job_id, JobStatus::Processing, percent, message, None);

        if let Some(ref callback) = self.on_progress {
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
                callback(percent, message);
            }));
            if outcome.is_err() {
                warn!(job_id = %job_id, "Progress callback panicked at {}%", percent);
            }
        }
    }
}
