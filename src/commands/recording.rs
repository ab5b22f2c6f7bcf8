//! Recording-related Tauri commands
//!
//! Thin wrappers over the session controller. Every command runs on the UI
//! event loop side and returns quickly; capture work stays on the backend
//! worker owned by the channel.

use crate::capture::{self, CameraCaptureChannel, CameraInfo, CaptureConfig};
use crate::recorder::{
    RecordingFormat, RecordingOutcome, RecordingSession, RecordingState,
};
use crate::utils::ErrorResponse;
use std::path::PathBuf;
use std::sync::Arc;
use tauri::State;
use tokio::sync::Mutex;

/// Application state for recording
///
/// The single owner of the recording session; Tauri injects it into the
/// commands, so the UI never holds the controller itself.
pub struct RecorderState {
    pub session: Arc<Mutex<RecordingSession>>,
}

impl RecorderState {
    pub fn new(session: RecordingSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }
}

impl Default for RecorderState {
    fn default() -> Self {
        Self::new(RecordingSession::new())
    }
}

/// Get list of available cameras
#[tauri::command]
pub async fn get_cameras() -> Result<Vec<CameraInfo>, ErrorResponse> {
    Ok(capture::list_cameras())
}

/// Get every codec/container pair the backend accepts
#[tauri::command]
pub async fn get_supported_formats() -> Result<Vec<RecordingFormat>, ErrorResponse> {
    Ok(RecordingFormat::supported_formats())
}

/// Apply the output format for subsequent recordings
#[tauri::command]
pub async fn configure_recording(
    state: State<'_, RecorderState>,
    format: RecordingFormat,
) -> Result<(), ErrorResponse> {
    let mut session = state.session.lock().await;
    session.configure(format).map_err(ErrorResponse::from)
}

/// Start recording from a camera
#[tauri::command]
pub async fn start_recording(
    state: State<'_, RecorderState>,
    config: CaptureConfig,
) -> Result<(), ErrorResponse> {
    let mut session = state.session.lock().await;

    if let Some(dir) = &config.output_dir {
        session.set_output_dir(PathBuf::from(dir));
    }

    let channel = CameraCaptureChannel::new(
        config.device_id.clone(),
        config.width,
        config.height,
        config.fps,
    );
    session
        .attach_channel(Box::new(channel))
        .map_err(ErrorResponse::from)?;

    session.start().await.map_err(ErrorResponse::from)
}

/// Stop recording and finalize the output file
#[tauri::command]
pub async fn stop_recording(
    state: State<'_, RecorderState>,
) -> Result<RecordingOutcome, ErrorResponse> {
    let mut session = state.session.lock().await;
    session.stop().await.map_err(ErrorResponse::from)
}

/// Pause recording
#[tauri::command]
pub async fn pause_recording(state: State<'_, RecorderState>) -> Result<(), ErrorResponse> {
    let mut session = state.session.lock().await;
    session.pause().await.map_err(ErrorResponse::from)
}

/// Resume recording
#[tauri::command]
pub async fn resume_recording(state: State<'_, RecorderState>) -> Result<(), ErrorResponse> {
    let mut session = state.session.lock().await;
    session.resume().await.map_err(ErrorResponse::from)
}

/// Get current recording state
#[tauri::command]
pub async fn get_recording_state(
    state: State<'_, RecorderState>,
) -> Result<RecordingState, ErrorResponse> {
    let session = state.session.lock().await;
    Ok(session.state())
}

/// Get the applied recording format, if any
#[tauri::command]
pub async fn get_recording_format(
    state: State<'_, RecorderState>,
) -> Result<Option<RecordingFormat>, ErrorResponse> {
    let session = state.session.lock().await;
    Ok(session.format())
}

/// Get current recording duration in milliseconds
#[tauri::command]
pub async fn get_recording_duration(
    state: State<'_, RecorderState>,
) -> Result<f64, ErrorResponse> {
    let session = state.session.lock().await;
    Ok(session.duration_ms())
}

/// Capture a single still frame to a PNG file
#[tauri::command]
pub async fn capture_snapshot(
    device_id: Option<String>,
    output_dir: Option<String>,
) -> Result<String, ErrorResponse> {
    let dir = output_dir
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);

    // Snapshot capture opens its own short-lived camera handle; run it off
    // the event loop.
    let path = tokio::task::spawn_blocking(move || {
        capture::capture_snapshot(device_id.as_deref(), &dir)
    })
    .await
    .map_err(|e| ErrorResponse::from(crate::recorder::RecordError::Encoder(e.to_string())))?
    .map_err(ErrorResponse::from)?;

    Ok(path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_outcome_serializes_camel_case() {
        let outcome = RecordingOutcome {
            output_path: "/tmp/recording-20260808-120000.mp4".to_string(),
            duration_ms: 3330.0,
            segment_count: 2,
        };

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("outputPath"));
        assert!(json.contains("segmentCount"));
    }

    #[tokio::test]
    async fn recorder_state_starts_idle() {
        let state = RecorderState::default();
        let session = state.session.lock().await;
        assert_eq!(session.state(), RecordingState::Idle);
        assert_eq!(session.format(), None);
    }
}
