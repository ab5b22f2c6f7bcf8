//! Camera capture using nokhwa
//!
//! Frames are pulled from the camera on a dedicated worker thread and piped
//! into the FFmpeg encoder sidecar. Pausing keeps the camera stream and the
//! container open; paused frames are drained and discarded so one file spans
//! the whole session.

use async_trait::async_trait;
use nokhwa::pixel_format::{RgbAFormat, RgbFormat};
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution as NokhwaResolution,
};
use nokhwa::Camera;
use parking_lot::Mutex as ParkingMutex;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::encoder::{ffmpeg_available, FfmpegEncoder};
use super::traits::{CameraInfo, Resolution};
use crate::recorder::channel::CaptureChannel;
use crate::recorder::error::{RecordError, RecordResult};
use crate::recorder::state::RecordingFormat;

/// Get list of available cameras
pub fn list_cameras() -> Vec<CameraInfo> {
    match nokhwa::query(ApiBackend::Auto) {
        Ok(cameras) => cameras
            .into_iter()
            .map(|info| {
                let id = match info.index() {
                    CameraIndex::Index(i) => i.to_string(),
                    CameraIndex::String(s) => s.to_string(),
                };
                let name = info.human_name().to_string();

                // Common resolutions
                let resolutions = vec![
                    Resolution {
                        width: 1920,
                        height: 1080,
                    },
                    Resolution {
                        width: 1280,
                        height: 720,
                    },
                    Resolution {
                        width: 640,
                        height: 480,
                    },
                ];

                CameraInfo {
                    id,
                    name,
                    supported_resolutions: resolutions,
                }
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate cameras: {:?}", e);
            Vec::new()
        }
    }
}

fn camera_index(device_id: Option<&str>) -> CameraIndex {
    match device_id {
        Some(id) => {
            // Try to parse as integer first
            if let Ok(idx) = id.parse::<u32>() {
                CameraIndex::Index(idx)
            } else {
                CameraIndex::String(id.to_string())
            }
        }
        None => CameraIndex::Index(0), // Default to first camera
    }
}

/// Map nokhwa frame formats to FFmpeg pixel format strings
fn ffmpeg_pixel_format(frame_format: FrameFormat) -> &'static str {
    match frame_format {
        FrameFormat::YUYV => "yuyv422",
        FrameFormat::NV12 => "nv12",
        FrameFormat::RAWRGB => "rgb24",
        FrameFormat::MJPEG => "mjpeg",
        _ => {
            tracing::warn!(
                "Unknown camera format {:?}, falling back to yuyv422",
                frame_format
            );
            "yuyv422"
        }
    }
}

/// Camera capture channel feeding the FFmpeg encoder
pub struct CameraCaptureChannel {
    /// Channel identifier
    id: String,

    /// Device ID/index to capture from (None = default camera)
    device_id: Option<String>,

    /// Whether the worker is running
    is_recording: Arc<AtomicBool>,

    /// Whether frame delivery is suspended
    is_paused: Arc<AtomicBool>,

    /// Bound output file
    output_path: Option<PathBuf>,

    /// Output format applied at initialize
    format: Option<RecordingFormat>,

    /// Requested capture width
    width: u32,

    /// Requested capture height
    height: u32,

    /// Capture FPS
    fps: u32,

    /// Failure parked by the worker, surfaced at stop
    worker_error: Arc<ParkingMutex<Option<RecordError>>>,

    /// Finalized container path produced by the worker
    finished_path: Arc<ParkingMutex<Option<PathBuf>>>,

    /// Capture thread handle
    capture_thread: Option<std::thread::JoinHandle<()>>,
}

impl CameraCaptureChannel {
    /// Create a new camera capture channel
    pub fn new(device_id: Option<String>, width: u32, height: u32, fps: u32) -> Self {
        Self {
            id: "camera".to_string(),
            device_id,
            is_recording: Arc::new(AtomicBool::new(false)),
            is_paused: Arc::new(AtomicBool::new(false)),
            output_path: None,
            format: None,
            width,
            height,
            fps,
            worker_error: Arc::new(ParkingMutex::new(None)),
            finished_path: Arc::new(ParkingMutex::new(None)),
            capture_thread: None,
        }
    }
}

#[async_trait]
impl CaptureChannel for CameraCaptureChannel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn initialize(
        &mut self,
        output_path: &Path,
        format: &RecordingFormat,
    ) -> RecordResult<()> {
        if !ffmpeg_available() {
            return Err(RecordError::Encoder(
                "FFmpeg not found. Please install FFmpeg and make sure it is on PATH".to_string(),
            ));
        }

        let cameras = list_cameras();
        if cameras.is_empty() {
            return Err(RecordError::DeviceUnavailable("no cameras found".to_string()));
        }

        self.output_path = Some(output_path.to_path_buf());
        self.format = Some(*format);

        tracing::info!(
            "Camera capture channel initialized ({}x{} @ {}fps, {:?})",
            self.width,
            self.height,
            self.fps,
            output_path
        );
        Ok(())
    }

    async fn start(&mut self) -> RecordResult<()> {
        if self.is_recording.load(Ordering::SeqCst) {
            return Err(RecordError::AlreadyRecording);
        }

        let output_path = self
            .output_path
            .clone()
            .ok_or_else(|| RecordError::Encoder("output path not set".to_string()))?;
        let format = self
            .format
            .ok_or_else(|| RecordError::Encoder("format not applied".to_string()))?;

        self.is_recording.store(true, Ordering::SeqCst);
        self.is_paused.store(false, Ordering::SeqCst);

        // Capture on a background thread; the encoder is created inside the
        // thread once the actual camera geometry is known.
        let index = camera_index(self.device_id.as_deref());
        let is_recording = self.is_recording.clone();
        let is_paused = self.is_paused.clone();
        let worker_error = self.worker_error.clone();
        let finished_path = self.finished_path.clone();
        let requested_width = self.width;
        let requested_height = self.height;
        let requested_fps = self.fps;

        let handle = std::thread::spawn(move || {
            let requested = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::Closest(
                CameraFormat::new(
                    NokhwaResolution::new(requested_width, requested_height),
                    FrameFormat::YUYV,
                    requested_fps,
                ),
            ));

            let mut camera = match Camera::new(index.clone(), requested) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!("Failed to open camera {:?}: {:?}", index, e);
                    *worker_error.lock() =
                        Some(RecordError::DeviceUnavailable(e.to_string()));
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            if let Err(e) = camera.open_stream() {
                tracing::error!("Failed to open camera stream: {:?}", e);
                *worker_error.lock() = Some(RecordError::DeviceUnavailable(e.to_string()));
                is_recording.store(false, Ordering::SeqCst);
                return;
            }

            let camera_format = camera.camera_format();
            let actual_width = camera_format.resolution().width();
            let actual_height = camera_format.resolution().height();
            let actual_fps = camera_format.frame_rate();
            let pixel_format = ffmpeg_pixel_format(camera_format.format());

            tracing::info!(
                "Camera opened: {}x{} @ {}fps, pix_fmt={} (requested {}x{} @ {}fps)",
                actual_width,
                actual_height,
                actual_fps,
                pixel_format,
                requested_width,
                requested_height,
                requested_fps
            );

            let encoder = match FfmpegEncoder::new(
                actual_width,
                actual_height,
                actual_fps,
                pixel_format,
                &format,
                &output_path,
            ) {
                Ok(e) => e,
                Err(e) => {
                    tracing::error!("Failed to start FFmpeg encoder: {e}");
                    *worker_error.lock() = Some(e);
                    let _ = camera.stop_stream();
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            let mut captured: u64 = 0;
            let capture_start = std::time::Instant::now();

            while is_recording.load(Ordering::SeqCst) {
                // Blocks until the camera delivers the next frame; the camera
                // controls the timing.
                match camera.frame() {
                    Ok(frame) => {
                        // Paused frames are drained to keep the device buffer
                        // moving, then dropped.
                        if is_paused.load(Ordering::SeqCst) {
                            continue;
                        }
                        encoder.write_frame(frame.buffer());
                        captured += 1;
                    }
                    Err(e) => {
                        tracing::debug!("Failed to capture frame: {:?}", e);
                    }
                }
            }

            let elapsed = capture_start.elapsed();
            tracing::info!(
                "Camera captured {} frames in {:.2}s ({:.1} fps actual)",
                captured,
                elapsed.as_secs_f64(),
                captured as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
            );

            if let Err(e) = camera.stop_stream() {
                tracing::warn!("Error stopping camera stream: {:?}", e);
            }

            match encoder.finish() {
                Ok(path) => {
                    *finished_path.lock() = Some(path);
                }
                Err(e) => {
                    tracing::error!("Failed to finish encoding: {e}");
                    *worker_error.lock() = Some(e);
                }
            }

            tracing::info!("Camera capture thread stopped");
        });

        self.capture_thread = Some(handle);

        tracing::info!(
            "Camera capture starting (requested {}x{} @ {}fps)",
            self.width,
            self.height,
            self.fps
        );
        Ok(())
    }

    async fn pause(&mut self) -> RecordResult<()> {
        if !self.is_recording.load(Ordering::SeqCst) {
            return Err(RecordError::NotRecording);
        }
        self.is_paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&mut self) -> RecordResult<()> {
        if !self.is_recording.load(Ordering::SeqCst) {
            return Err(RecordError::NotRecording);
        }
        self.is_paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&mut self) -> RecordResult<PathBuf> {
        if !self.is_recording.load(Ordering::SeqCst) && self.capture_thread.is_none() {
            return Err(RecordError::NotRecording);
        }

        self.is_recording.store(false, Ordering::SeqCst);
        self.is_paused.store(false, Ordering::SeqCst);

        // The worker finalizes the encoder on its way out.
        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
        }

        if let Some(err) = self.worker_error.lock().take() {
            return Err(err);
        }

        self.finished_path.lock().take().ok_or_else(|| {
            RecordError::WriteFailed("capture worker produced no output file".to_string())
        })
    }

    fn is_active(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst) && !self.is_paused.load(Ordering::SeqCst)
    }
}

/// Capture a single frame to a PNG file
pub fn capture_snapshot(device_id: Option<&str>, output_dir: &Path) -> RecordResult<PathBuf> {
    let requested =
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);

    let mut camera = Camera::new(camera_index(device_id), requested)
        .map_err(|e| RecordError::DeviceUnavailable(e.to_string()))?;
    camera
        .open_stream()
        .map_err(|e| RecordError::DeviceUnavailable(e.to_string()))?;

    let frame = camera
        .frame()
        .map_err(|e| RecordError::DeviceUnavailable(e.to_string()))?;
    let image = frame
        .decode_image::<RgbFormat>()
        .map_err(|e| RecordError::Encoder(format!("Failed to decode frame: {e}")))?;

    if let Err(e) = camera.stop_stream() {
        tracing::warn!("Error stopping camera stream: {:?}", e);
    }

    std::fs::create_dir_all(output_dir)?;
    let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
    let path = output_dir.join(format!("snapshot-{stamp}.png"));

    let file = std::fs::File::create(&path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), image.width(), image.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder
        .write_header()
        .map_err(|e| RecordError::Encoder(format!("Failed to write PNG header: {e}")))?;
    writer
        .write_image_data(image.as_raw())
        .map_err(|e| RecordError::Encoder(format!("Failed to write PNG data: {e}")))?;

    tracing::info!("Snapshot saved to {:?}", path);
    Ok(path)
}
