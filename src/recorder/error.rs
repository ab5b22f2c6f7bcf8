//! Recorder error types
//!
//! Errors crossing the session-controller boundary. All of these are
//! recoverable at the command surface except `BootstrapError`, which carries
//! the process exit code.

use thiserror::Error;

use super::state::{ContainerFormat, RecordingState, VideoCodec};

/// Errors from applying a recording format
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("codec {codec} cannot be muxed into a {container} container")]
    Unsupported {
        codec: VideoCodec,
        container: ContainerFormat,
    },

    #[error("format can only be changed while idle (session is {0})")]
    SessionBusy(RecordingState),
}

/// Errors from driving the recording lifecycle
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("no capture device available: {0}")]
    DeviceUnavailable(String),

    #[error("no recording format has been configured")]
    NoFormat,

    #[error("failed to finalize recording output: {0}")]
    WriteFailed(String),

    #[error("recording already in progress")]
    AlreadyRecording,

    #[error("no active recording")]
    NotRecording,

    #[error("encoder error: {0}")]
    Encoder(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for recording operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Fatal bootstrap failures
///
/// Raised only when the UI resource itself cannot be brought up; there is no
/// recovery path, so the process exits with `exit_code()`.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("failed to load UI resource: {0}")]
    UiResourceLoadFailed(#[from] tauri::Error),
}

impl BootstrapError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::UiResourceLoadFailed(_) => 70,
        }
    }
}
