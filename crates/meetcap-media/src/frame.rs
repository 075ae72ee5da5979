//! Raw frame streaming from FFmpeg.
//!
//! Frames are decoded as packed RGB24 over a pipe at a reduced sampling
//! rate. The stream is a blocking iterator; long scans run inside
//! `spawn_blocking` on the caller's side.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// One decoded video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Sample ordinal within the stream, 0-based
    pub index: u64,
    /// Presentation time in seconds
    pub timestamp: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Packed RGB24 pixel data, `width * height * 3` bytes
    pub rgb: Vec<u8>,
}

impl Frame {
    /// Construct a frame from raw RGB24 data.
    ///
    /// # Panics
    /// Panics if `rgb` is not exactly `width * height * 3` bytes.
    pub fn new(index: u64, timestamp: f64, width: u32, height: u32, rgb: Vec<u8>) -> Self {
        assert_eq!(
            rgb.len(),
            width as usize * height as usize * 3,
            "RGB buffer does not match {}x{} frame",
            width,
            height
        );
        Self {
            index,
            timestamp,
            width,
            height,
            rgb,
        }
    }

    /// Grayscale plane (Rec.601 luma), one byte per pixel.
    pub fn luma(&self) -> Vec<u8> {
        self.rgb
            .chunks_exact(3)
            .map(|px| {
                (0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64).round() as u8
            })
            .collect()
    }
}

/// Blocking frame iterator over an FFmpeg rawvideo pipe.
pub struct FrameStream {
    child: Child,
    stdout: std::process::ChildStdout,
    width: u32,
    height: u32,
    sample_fps: f64,
    next_index: u64,
    finished: bool,
}

impl FrameStream {
    /// Open a sampled frame stream over the given video.
    ///
    /// `sample_fps` controls the decode rate; timestamps are derived from
    /// the sample ordinal (`index / sample_fps`).
    pub fn open(
        video_path: impl AsRef<Path>,
        width: u32,
        height: u32,
        sample_fps: f64,
    ) -> MediaResult<Self> {
        let video_path = video_path.as_ref();

        if !video_path.exists() {
            return Err(MediaError::FileNotFound(video_path.to_path_buf()));
        }
        if width == 0 || height == 0 || sample_fps <= 0.0 {
            return Err(MediaError::InvalidVideo(format!(
                "cannot stream {}x{} at {} fps",
                width, height, sample_fps
            )));
        }

        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        debug!(
            "Opening frame stream: {} at {} fps",
            video_path.display(),
            sample_fps
        );

        let mut child = Command::new("ffmpeg")
            .arg("-v")
            .arg("error")
            .arg("-i")
            .arg(video_path)
            .arg("-vf")
            .arg(format!("fps={}", sample_fps))
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("rgb24")
            .arg("pipe:1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdout = child.stdout.take().expect("stdout not captured");

        Ok(Self {
            child,
            stdout,
            width,
            height,
            sample_fps,
            next_index: 0,
            finished: false,
        })
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// Read one full frame; `Ok(None)` on clean end of stream.
    fn read_frame(&mut self) -> MediaResult<Option<Frame>> {
        let mut buf = vec![0u8; self.frame_len()];
        let mut filled = 0;

        while filled < buf.len() {
            match self.stdout.read(&mut buf[filled..]) {
                Ok(0) => {
                    if filled == 0 {
                        self.finish()?;
                        return Ok(None);
                    }
                    return Err(MediaError::frame_decode(format!(
                        "truncated frame at sample {} ({} of {} bytes)",
                        self.next_index,
                        filled,
                        buf.len()
                    )));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        let index = self.next_index;
        self.next_index += 1;
        Ok(Some(Frame::new(
            index,
            index as f64 / self.sample_fps,
            self.width,
            self.height,
            buf,
        )))
    }

    /// Reap the decoder and surface a non-zero exit.
    fn finish(&mut self) -> MediaResult<()> {
        self.finished = true;
        let status = self.child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                "frame decoder exited with non-zero status",
                None,
                status.code(),
            ))
        }
    }
}

impl Iterator for FrameStream {
    type Item = MediaResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl Drop for FrameStream {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.child.kill() {
                warn!("Failed to kill frame decoder: {}", e);
            }
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_of_solid_frame() {
        let frame = Frame::new(0, 0.0, 2, 2, vec![255u8; 12]);
        assert_eq!(frame.luma(), vec![255u8; 4]);

        let black = Frame::new(0, 0.0, 2, 2, vec![0u8; 12]);
        assert_eq!(black.luma(), vec![0u8; 4]);
    }

    #[test]
    #[should_panic(expected = "RGB buffer does not match")]
    fn test_frame_rejects_short_buffer() {
        Frame::new(0, 0.0, 4, 4, vec![0u8; 10]);
    }

    #[test]
    fn test_stream_rejects_missing_file() {
        let result = FrameStream::open("/nonexistent.mp4", 640, 360, 5.0);
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
