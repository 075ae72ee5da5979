//! Subtitle rendering and burn-in.
//!
//! Burn-in runs FFmpeg with its working directory pinned to a disposable
//! directory holding the subtitle file under a fixed ASCII name, so the
//! `subtitles=` filter argument is always a bare filename — never a path,
//! drive letter, or non-ASCII character. This sidesteps the filter's
//! path-parsing quirks on every platform.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use meetcap_models::timecode::format_srt;
use meetcap_models::Caption;

/// Fixed ASCII name of the subtitle file inside the working directory.
pub const SUBTITLE_WORK_FILE: &str = "captions.srt";

/// Fallback stem when sanitization strips a name down to nothing.
const DEFAULT_STEM: &str = "captioned_video";

/// Render captions as a SubRip (SRT) byte stream.
///
/// 1-based sequential indices, `HH:MM:SS,mmm --> HH:MM:SS,mmm` timestamps,
/// blank-line separated entries, UTF-8. Identical input yields
/// byte-identical output.
pub fn render_srt(captions: &[Caption]) -> Vec<u8> {
    let mut out = String::new();
    for caption in captions {
        out.push_str(&caption.index.to_string());
        out.push('\n');
        out.push_str(&format_srt(caption.start_time));
        out.push_str(" --> ");
        out.push_str(&format_srt(caption.end_time));
        out.push('\n');
        out.push_str(&caption.text);
        out.push_str("\n\n");
    }
    out.into_bytes()
}

/// Sanitize a requested output filename.
///
/// Strips non-ASCII characters, replaces anything outside `[A-Za-z0-9._-]`
/// with `_`, collapses repeated underscores, and guarantees a non-empty
/// stem.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for ch in name.chars() {
        if !ch.is_ascii() {
            continue;
        }
        let mapped = if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
            ch
        } else {
            '_'
        };
        if mapped == '_' {
            if prev_underscore {
                continue;
            }
            prev_underscore = true;
        } else {
            prev_underscore = false;
        }
        out.push(mapped);
    }

    match out.rfind('.') {
        // Hidden-file result means the stem was stripped away
        Some(0) => format!("{}{}", DEFAULT_STEM, out),
        Some(_) => out,
        None if out.is_empty() => DEFAULT_STEM.to_string(),
        None => out,
    }
}

/// Burn a subtitle payload into a video.
///
/// The returned path reflects the sanitized output name, which may differ
/// from `requested_name`. The working directory and subtitle file are
/// removed on every exit path; cleanup failure is logged, never escalated.
/// A non-zero tool exit surfaces as `FfmpegFailed` carrying the tool's
/// stderr and is never retried here.
pub async fn burn_in(
    video_path: impl AsRef<Path>,
    subtitle_bytes: &[u8],
    requested_name: &str,
    output_dir: impl AsRef<Path>,
) -> MediaResult<PathBuf> {
    // Both endpoints must be absolute: the child's cwd is the work dir
    let video_path = absolutize(video_path.as_ref())?;
    let output_dir = absolutize(output_dir.as_ref())?;

    let workdir = tempfile::Builder::new()
        .prefix("meetcap-srt-")
        .tempdir()?;
    tokio::fs::write(workdir.path().join(SUBTITLE_WORK_FILE), subtitle_bytes).await?;

    let clean_name = sanitize_file_name(requested_name);
    if clean_name != requested_name {
        info!("Output name sanitized: {:?} -> {:?}", requested_name, clean_name);
    }
    let output_path = output_dir.join(&clean_name);

    info!(
        "Burning subtitles into {} -> {}",
        video_path.display(),
        output_path.display()
    );

    let cmd = FfmpegCommand::new(&video_path, &output_path)
        .current_dir(workdir.path())
        .video_filter(format!(
            "subtitles=filename={}:charenc=UTF-8",
            SUBTITLE_WORK_FILE
        ))
        .video_codec("libx264")
        .preset("ultrafast")
        .crf(23)
        .audio_codec("copy")
        .log_level("error");

    let result = FfmpegRunner::new().run(&cmd).await;

    let workdir_path = workdir.path().to_path_buf();
    if let Err(e) = workdir.close() {
        warn!(
            "Failed to remove subtitle working directory {}: {}",
            workdir_path.display(),
            e
        );
    }

    result?;
    Ok(output_path)
}

fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
