//! FFmpeg encoder sidecar
//!
//! Raw camera frames are piped over stdin into an FFmpeg child process that
//! encodes and muxes them according to the session's `RecordingFormat`.

use parking_lot::Mutex as ParkingMutex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::recorder::error::{RecordError, RecordResult};
use crate::recorder::state::{ContainerFormat, RecordingFormat, VideoCodec};

/// Check whether the FFmpeg binary is reachable
pub fn ffmpeg_available() -> bool {
    Command::new("ffmpeg").arg("-version").output().is_ok()
}

/// FFmpeg encoder arguments for one recording
///
/// Pure construction, kept separate from process spawning so every
/// codec/container pair is testable without FFmpeg installed.
pub(crate) fn encoder_args(
    width: u32,
    height: u32,
    fps: u32,
    pixel_format: &str,
    format: &RecordingFormat,
    output_path: &Path,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pixel_format".into(),
        pixel_format.into(),
        "-video_size".into(),
        format!("{width}x{height}"),
        "-framerate".into(),
        fps.to_string(),
        "-i".into(),
        "-".into(),
    ];

    let gop = (fps * 2).to_string();
    match format.video_codec {
        VideoCodec::H264 => {
            args.extend(
                ["-c:v", "libx264", "-preset", "veryfast", "-crf", "18"]
                    .map(String::from),
            );
        }
        VideoCodec::Hevc => {
            args.extend(
                ["-c:v", "libx265", "-preset", "veryfast", "-crf", "22"]
                    .map(String::from),
            );
            if format.container == ContainerFormat::Mpeg4 {
                args.extend(["-tag:v", "hvc1"].map(String::from));
            }
        }
        VideoCodec::Vp9 => {
            args.extend(
                ["-c:v", "libvpx-vp9", "-b:v", "0", "-crf", "32"].map(String::from),
            );
        }
    }
    args.extend(["-pix_fmt", "yuv420p", "-g"].map(String::from));
    args.push(gop);

    match format.container {
        ContainerFormat::Mpeg4 => {
            args.extend(["-movflags", "+faststart", "-f", "mp4"].map(String::from));
        }
        ContainerFormat::Matroska => {
            args.extend(["-f", "matroska"].map(String::from));
        }
        ContainerFormat::Webm => {
            args.extend(["-f", "webm"].map(String::from));
        }
    }

    args.push(output_path.to_string_lossy().to_string());
    args
}

/// Encoder child process fed raw frames from the capture thread
pub struct FfmpegEncoder {
    process: ParkingMutex<Option<Child>>,
    frame_count: AtomicU64,
    running: AtomicBool,
    output_path: PathBuf,
}

impl FfmpegEncoder {
    /// Spawn FFmpeg for the given capture parameters and output format
    pub fn new(
        width: u32,
        height: u32,
        fps: u32,
        pixel_format: &str,
        format: &RecordingFormat,
        output_path: &Path,
    ) -> RecordResult<Self> {
        let args = encoder_args(width, height, fps, pixel_format, format, output_path);

        let process = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RecordError::Encoder(format!("Failed to start FFmpeg: {e}")))?;

        tracing::info!(
            "Started FFmpeg encoder: {}x{} @ {}fps, pixel_format={}, codec={}, output: {:?}",
            width,
            height,
            fps,
            pixel_format,
            format.video_codec,
            output_path
        );

        Ok(Self {
            process: ParkingMutex::new(Some(process)),
            frame_count: AtomicU64::new(0),
            running: AtomicBool::new(true),
            output_path: output_path.to_path_buf(),
        })
    }

    /// Write one raw frame; returns false once the encoder has gone away
    pub fn write_frame(&self, data: &[u8]) -> bool {
        if !self.running.load(Ordering::Relaxed) {
            return false;
        }

        let mut guard = self.process.lock();
        if let Some(ref mut process) = *guard {
            if let Some(ref mut stdin) = process.stdin {
                if stdin.write_all(data).is_ok() {
                    self.frame_count.fetch_add(1, Ordering::Relaxed);
                    return true;
                }
            }
        }
        false
    }

    /// Number of frames handed to the encoder
    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Relaxed)
    }

    /// Close the input stream, wait for FFmpeg, and return the container path
    pub fn finish(&self) -> RecordResult<PathBuf> {
        self.running.store(false, Ordering::Relaxed);
        let mut guard = self.process.lock();
        if let Some(mut process) = guard.take() {
            // Close stdin to signal EOF, then let FFmpeg flush the container.
            drop(process.stdin.take());
            let output = process
                .wait_with_output()
                .map_err(|e| RecordError::WriteFailed(format!("FFmpeg did not exit: {e}")))?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(RecordError::WriteFailed(format!(
                    "FFmpeg exited with {}: {}",
                    output.status,
                    stderr.trim().lines().last().unwrap_or("")
                )));
            }
        }

        if !self.output_path.exists() {
            return Err(RecordError::WriteFailed(format!(
                "output file missing: {:?}",
                self.output_path
            )));
        }

        tracing::info!(
            "FFmpeg encoder finished: {} frames, output: {:?}",
            self.frame_count(),
            self.output_path
        );

        Ok(self.output_path.clone())
    }
}
