//! Open Camcorder - Simple camera recordings, made easy.
//!
//! This is the main library crate for the Open Camcorder application.
//! It provides the Tauri application setup and all backend functionality.

pub mod capture;
pub mod commands;
pub mod recorder;
pub mod utils;

use commands::recording::RecorderState;
use recorder::{BootstrapError, RecordingFormat, RecordingSession};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the application
///
/// Publishes the recording session into the UI binding context before the UI
/// resource loads; a UI load failure is fatal and exits with a distinguished
/// code.
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "open_camcorder=debug,tauri=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Open Camcorder v{}", env!("CARGO_PKG_VERSION"));

    // Apply the default output format before any UI binding can start a
    // recording. The default pair is always in the support table.
    let mut session = RecordingSession::new();
    if let Err(err) = session.configure(RecordingFormat::default()) {
        tracing::warn!("default recording format rejected: {err}");
    }

    let result = tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .manage(RecorderState::new(session))
        .invoke_handler(tauri::generate_handler![
            // Recording commands
            commands::recording::get_cameras,
            commands::recording::get_supported_formats,
            commands::recording::configure_recording,
            commands::recording::start_recording,
            commands::recording::stop_recording,
            commands::recording::pause_recording,
            commands::recording::resume_recording,
            commands::recording::get_recording_state,
            commands::recording::get_recording_format,
            commands::recording::get_recording_duration,
            commands::recording::capture_snapshot,
            // System commands
            commands::system::get_system_info,
        ])
        .run(tauri::generate_context!());

    if let Err(err) = result {
        let err = BootstrapError::UiResourceLoadFailed(err);
        tracing::error!("{err}");
        std::process::exit(err.exit_code());
    }
}
