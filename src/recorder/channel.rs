//! Capture channel abstraction
//!
//! A `CaptureChannel` is the session controller's handle onto one capture
//! backend (camera + encoder). The controller owns exactly one channel at a
//! time and drives it through the recording lifecycle.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::RecordResult;
use super::state::RecordingFormat;

/// One capture source feeding one output container
#[async_trait]
pub trait CaptureChannel: Send {
    /// Stable identifier for logging
    fn id(&self) -> &str;

    /// Probe the backend and bind the output location
    ///
    /// Called once before `start`. Fails fast when no device or encoder is
    /// reachable, so `start` never half-opens a session.
    async fn initialize(&mut self, output_path: &Path, format: &RecordingFormat)
        -> RecordResult<()>;

    /// Begin capturing frames
    async fn start(&mut self) -> RecordResult<()>;

    /// Suspend frame delivery without closing the container
    async fn pause(&mut self) -> RecordResult<()>;

    /// Resume frame delivery after a pause
    async fn resume(&mut self) -> RecordResult<()>;

    /// Stop capturing, flush the container, and return its location
    async fn stop(&mut self) -> RecordResult<PathBuf>;

    /// Whether frames are currently being captured
    fn is_active(&self) -> bool;
}
