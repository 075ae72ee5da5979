//! Audio track extraction.

use std::path::Path;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Sample rate expected by the transcription collaborator.
pub const TRANSCRIPTION_SAMPLE_RATE: u32 = 16_000;

/// Extract the audio track as mono 16 kHz PCM WAV.
///
/// Decoder errors in damaged containers are ignored (`-err_detect
/// ignore_err`) so a partially corrupt meeting recording still yields
/// transcribable audio.
pub async fn extract_audio(
    video_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> MediaResult<()> {
    let video_path = video_path.as_ref();
    let output_path = output_path.as_ref();

    info!("Extracting audio from {}", video_path.display());

    let cmd = FfmpegCommand::new(video_path, output_path)
        .input_arg("-err_detect")
        .input_arg("ignore_err")
        .no_video()
        .audio_codec("pcm_s16le")
        .audio_rate(TRANSCRIPTION_SAMPLE_RATE)
        .audio_channels(1)
        .log_level("error");

    FfmpegRunner::new().run(&cmd).await?;

    if !output_path.exists() {
        return Err(MediaError::ffmpeg_failed(
            format!("Audio file not created: {}", output_path.display()),
            None,
            None,
        ));
    }

    info!("Audio extracted to {}", output_path.display());
    Ok(())
}
