//! Meeting captioning worker binary.
//!
//! Runs the full pipeline for one local video source and polls the job
//! registry until the job reaches a terminal state.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use meetcap_models::{JobId, JobStatus};
use meetcap_pipeline::{
    FfmpegAdapter, FileLoader, JobRegistry, PipelineConfig, PipelineOrchestrator,
    SectionSummarizer, WhisperCliTranscriber,
};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("meetcap=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let source = match std::env::args().nth(1) {
        Some(source) => source,
        None => {
            eprintln!("Usage: meetcap <video-file>");
            std::process::exit(2);
        }
    };

    info!("Starting meetcap worker");

    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    let transcriber = match WhisperCliTranscriber::from_env() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to configure transcription engine: {}", e);
            std::process::exit(1);
        }
    };

    let registry = JobRegistry::new();
    let orchestrator = Arc::new(PipelineOrchestrator::new(
        config.clone(),
        Arc::new(FileLoader),
        Arc::new(transcriber),
        Arc::new(FfmpegAdapter::new(&config)),
        SectionSummarizer::from_env(config.max_key_points),
        registry.clone(),
    ));

    let job_id = JobId::new();
    registry.create(&job_id);
    info!("Job accepted: {}", job_id);

    // Each job runs as an independent background task
    let job_handle = {
        let orchestrator = Arc::clone(&orchestrator);
        let job_id = job_id.clone();
        tokio::spawn(async move { orchestrator.run_job(&job_id, &source).await })
    };

    // Poll status snapshots the way a serving layer would
    let mut last_message = String::new();
    loop {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let Some(record) = registry.get(&job_id) else {
            continue;
        };
        if record.message != last_message {
            println!("[{:3}%] {}", record.progress, record.message);
            last_message = record.message.clone();
        }
        if record.status.is_terminal() {
            break;
        }
    }

    let result = match job_handle.await {
        Ok(result) => result,
        Err(e) => {
            error!("Job task panicked: {}", e);
            std::process::exit(1);
        }
    };

    let record = registry.get(&job_id);
    match record.map(|r| r.status) {
        Some(JobStatus::Completed) => {
            println!("Outputs in: {}", result.output_dir.display());
            if let Some(video) = result.captioned_video_path {
                println!("Captioned video: {}", video.display());
            }
            for (format, path) in result.report_paths {
                println!("Report ({}): {}", format, path.display());
            }
        }
        status => {
            eprintln!(
                "Job ended with status {:?}: {}",
                status,
                result.error.unwrap_or_default()
            );
            std::process::exit(1);
        }
    }
}
