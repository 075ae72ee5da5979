//! End-to-end orchestrator tests with stub collaborators.
//!
//! External tools (decoder, transcription engine) are replaced by stubs so
//! the state machine, failure mapping and artifact layout can be exercised
//! hermetically.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use meetcap_media::error::MediaResult;
use meetcap_media::sanitize_file_name;
use meetcap_models::{JobId, JobStatus, Scene, TranscriptFragment, VideoMetadata};
use meetcap_pipeline::error::StageResult;
use meetcap_pipeline::{
    JobRegistry, MediaAdapter, PipelineConfig, PipelineError, PipelineOrchestrator,
    SectionSummarizer, Transcriber, VideoLoader,
};

struct StubLoader {
    video_path: PathBuf,
}

#[async_trait]
impl VideoLoader for StubLoader {
    async fn load(&self, _source: &str) -> StageResult<(PathBuf, VideoMetadata)> {
        Ok((
            self.video_path.clone(),
            VideoMetadata {
                duration: 40.0,
                fps: 30.0,
                width: 640,
                height: 360,
                frame_count: 1200,
                has_audio: true,
                size_bytes: 1024,
            },
        ))
    }
}

/// Media adapter that fabricates artifacts instead of shelling out.
struct StubMedia;

#[async_trait]
impl MediaAdapter for StubMedia {
    async fn extract_audio(&self, _video: &Path, output: &Path) -> MediaResult<()> {
        tokio::fs::write(output, b"RIFF-fake-wav").await?;
        Ok(())
    }

    async fn detect_scenes(
        &self,
        _video: &Path,
        metadata: &VideoMetadata,
        _frames_dir: Option<&Path>,
    ) -> MediaResult<Vec<Scene>> {
        let mut first = Scene::open(1, 0.0, 0, 0.0);
        first.end_time = Some(20.0);
        first.end_frame = Some(100);
        let mut second = Scene::open(2, 20.0, 100, 75.0);
        second.end_time = Some(metadata.duration);
        second.end_frame = Some(200);
        Ok(vec![first, second])
    }

    async fn burn_in(
        &self,
        _video: &Path,
        subtitle_bytes: &[u8],
        requested_name: &str,
        output_dir: &Path,
    ) -> MediaResult<PathBuf> {
        let output = output_dir.join(sanitize_file_name(requested_name));
        tokio::fs::write(&output, subtitle_bytes).await?;
        Ok(output)
    }
}

struct StubTranscriber;

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> StageResult<Vec<TranscriptFragment>> {
        Ok(vec![
            TranscriptFragment {
                id: 0,
                start_time: 0.0,
                end_time: 10.0,
                text: "Welcome to the meeting.".to_string(),
                confidence: 0.95,
            },
            TranscriptFragment {
                id: 1,
                start_time: 10.0,
                end_time: 20.0,
                text: "The key decision is to ship.".to_string(),
                confidence: 0.92,
            },
            TranscriptFragment {
                id: 2,
                start_time: 25.0,
                end_time: 35.0,
                text: "Any questions?".to_string(),
                confidence: 0.9,
            },
        ])
    }
}

struct FailingTranscriber;

#[async_trait]
impl Transcriber for FailingTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> StageResult<Vec<TranscriptFragment>> {
        Err(PipelineError::transcription_failed(
            "engine unavailable: whisper-cli not found",
        ))
    }
}

struct Fixture {
    _tmp: tempfile::TempDir,
    registry: JobRegistry,
    orchestrator: PipelineOrchestrator,
}

fn fixture(transcriber: Arc<dyn Transcriber>, burn_captions: bool) -> Fixture {
    let tmp = tempfile::tempdir().unwrap();

    let video_path = tmp.path().join("Weekly Sync.mp4");
    std::fs::write(&video_path, b"not really a video").unwrap();

    let config = PipelineConfig {
        output_dir: tmp.path().join("outputs"),
        burn_captions,
        ..PipelineConfig::default()
    };

    let registry = JobRegistry::new();
    let orchestrator = PipelineOrchestrator::new(
        config,
        Arc::new(StubLoader { video_path }),
        transcriber,
        Arc::new(StubMedia),
        SectionSummarizer::local(5),
        registry.clone(),
    );

    Fixture {
        _tmp: tmp,
        registry,
        orchestrator,
    }
}

#[tokio::test]
async fn completed_job_produces_all_artifacts() {
    let fixture = fixture(Arc::new(StubTranscriber), true);
    let job_id = JobId::new();
    fixture.registry.create(&job_id);

    let result = fixture.orchestrator.run_job(&job_id, "ignored").await;

    assert!(result.success, "pipeline failed: {:?}", result.error);
    assert!(result.output_dir.is_dir());
    assert!(result.report_paths["json"].is_file());

    let captioned = result.captioned_video_path.expect("burn-in ran");
    assert_eq!(
        captioned.file_name().unwrap().to_str().unwrap(),
        "Weekly_Sync_captioned.mp4"
    );
    assert!(captioned.is_file());

    assert!(result.output_dir.join("captions/captions.srt").is_file());
    assert!(result.output_dir.join("audio/transcript.txt").is_file());
    assert!(result.output_dir.join("manifest.json").is_file());

    let record = fixture.registry.get(&job_id).unwrap();
    assert_eq!(record.status, JobStatus::Completed);
    assert_eq!(record.progress, 100);
    let output = record.result.unwrap();
    assert_eq!(output.scene_count, 2);
    // 5s pause between fragment 1 and 2 splits the transcript
    assert_eq!(output.section_count, 2);
}

#[tokio::test]
async fn progress_is_non_decreasing() {
    let fixture = fixture(Arc::new(StubTranscriber), true);
    let job_id = JobId::new();

    let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let orchestrator = fixture
        .orchestrator
        .with_progress_callback(Arc::new(move |percent, _message| {
            sink.lock().unwrap().push(percent);
        }));

    let result = orchestrator.run_job(&job_id, "ignored").await;
    assert!(result.success);

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{:?}", seen);
    assert_eq!(*seen.last().unwrap(), 100);
}

#[tokio::test]
async fn progress_callback_panic_is_absorbed() {
    let fixture = fixture(Arc::new(StubTranscriber), false);
    let job_id = JobId::new();

    let orchestrator = fixture
        .orchestrator
        .with_progress_callback(Arc::new(|_percent, _message| {
            panic!("observer bug");
        }));

    let result = orchestrator.run_job(&job_id, "ignored").await;
    assert!(result.success);
}

#[tokio::test]
async fn transcription_failure_preserves_partial_artifacts() {
    let fixture = fixture(Arc::new(FailingTranscriber), true);
    let job_id = JobId::new();
    fixture.registry.create(&job_id);

    let result = fixture.orchestrator.run_job(&job_id, "ignored").await;

    assert!(!result.success);
    let error = result.error.as_deref().unwrap();
    assert!(error.starts_with("Transcription failed"), "{}", error);

    // The session directory survives with pre-failure artifacts
    assert!(result.output_dir.is_dir());
    assert!(result.output_dir.join("audio/audio.wav").is_file());
    assert!(!result.output_dir.join("reports/report.json").exists());

    let record = fixture.registry.get(&job_id).unwrap();
    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.error.is_some());
}

#[tokio::test]
async fn skipping_burn_in_leaves_no_captioned_video() {
    let fixture = fixture(Arc::new(StubTranscriber), false);
    let job_id = JobId::new();

    let result = fixture.orchestrator.run_job(&job_id, "ignored").await;

    assert!(result.success);
    assert!(result.captioned_video_path.is_none());
    assert!(result.output_dir.join("captions/captions.srt").is_file());
}

#[tokio::test]
async fn cancelled_job_stops_at_stage_boundary() {
    let fixture = fixture(Arc::new(StubTranscriber), true);
    let job_id = JobId::new();
    fixture.registry.create(&job_id);

    // Cancellation lands before the run reaches its first stage boundary
    assert!(fixture.registry.cancel(&job_id));

    let result = fixture.orchestrator.run_job(&job_id, "ignored").await;

    assert!(!result.success);
    let record = fixture.registry.get(&job_id).unwrap();
    assert_eq!(record.status, JobStatus::Cancelled);
    assert!(!result.output_dir.join("reports/report.json").exists());
}
