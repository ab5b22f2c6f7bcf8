//! Recording session controller
//!
//! Owns the single capture channel for the process and drives it through the
//! recording lifecycle. The session is only ever mutated from the UI event
//! loop (behind the managed-state mutex); backend threads report back through
//! the channel implementation and the event broadcast.

use std::path::PathBuf;
use std::time::Instant;

use tokio::sync::broadcast;

use super::channel::CaptureChannel;
use super::error::{ConfigError, RecordError, RecordResult};
use super::state::{RecordingFormat, RecordingOutcome, RecordingSegment, RecordingState};

/// Events emitted on session transitions
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Recording started
    Started,
    /// Recording stopped, output finalized at this path
    Stopped(String),
    /// Recording paused
    Paused,
    /// Recording resumed
    Resumed,
    /// A lifecycle operation failed
    Error(String),
}

/// Controller for one camera recording session
pub struct RecordingSession {
    /// Current lifecycle state
    state: RecordingState,

    /// Applied output format, if `configure` has succeeded
    format: Option<RecordingFormat>,

    /// The capture channel (recorder handle); exclusively owned
    channel: Option<Box<dyn CaptureChannel>>,

    /// Recorded segments (one per pause/resume cycle)
    segments: Vec<RecordingSegment>,

    /// Directory the output file is written into
    output_dir: PathBuf,

    /// Time when recording started (for process time calculation)
    start_time: Option<Instant>,

    /// Event broadcaster
    event_tx: broadcast::Sender<SessionEvent>,
}

impl RecordingSession {
    /// Create an idle, unconfigured session
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            state: RecordingState::Idle,
            format: None,
            channel: None,
            segments: Vec::new(),
            output_dir: std::env::temp_dir(),
            start_time: None,
            event_tx,
        }
    }

    /// Get the current recording state
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Get the applied format, if any
    pub fn format(&self) -> Option<RecordingFormat> {
        self.format
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Set the directory recordings are written into
    pub fn set_output_dir(&mut self, dir: PathBuf) {
        self.output_dir = dir;
    }

    /// Apply the output format for subsequent recordings
    ///
    /// Valid only while idle; the format is immutable for the lifetime of a
    /// recording.
    pub fn configure(&mut self, format: RecordingFormat) -> Result<(), ConfigError> {
        if self.state != RecordingState::Idle {
            return Err(ConfigError::SessionBusy(self.state));
        }

        if !format.is_supported() {
            return Err(ConfigError::Unsupported {
                codec: format.video_codec,
                container: format.container,
            });
        }

        tracing::info!(
            "Recording format set: {} in {}",
            format.video_codec,
            format.container
        );
        self.format = Some(format);
        Ok(())
    }

    /// Install the capture channel driven by this session
    ///
    /// Replaces any previously attached channel. Valid only while idle.
    pub fn attach_channel(&mut self, channel: Box<dyn CaptureChannel>) -> RecordResult<()> {
        if self.state != RecordingState::Idle {
            return Err(RecordError::AlreadyRecording);
        }

        tracing::info!("Attaching capture channel: {}", channel.id());
        self.channel = Some(channel);
        Ok(())
    }

    /// Get the current process time in milliseconds
    fn process_time_ms(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }

    /// Start recording
    pub async fn start(&mut self) -> RecordResult<()> {
        if self.state != RecordingState::Idle {
            return Err(RecordError::AlreadyRecording);
        }

        let format = self.format.ok_or(RecordError::NoFormat)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_dir.join(format.output_file_name());

        // Take ownership for the fallible bring-up: a channel that failed to
        // initialize or start is dropped, not kept half-open.
        let mut channel = self
            .channel
            .take()
            .ok_or_else(|| RecordError::DeviceUnavailable("no capture channel attached".into()))?;

        tracing::info!("Starting recording to {:?}", output_path);

        channel.initialize(&output_path, &format).await?;
        channel.start().await?;
        self.channel = Some(channel);

        self.start_time = Some(Instant::now());
        self.segments.clear();
        self.segments.push(RecordingSegment::new(0, 0.0));

        self.state = RecordingState::Recording;
        let _ = self.event_tx.send(SessionEvent::Started);

        tracing::info!("Recording started");
        Ok(())
    }

    /// Pause recording
    pub async fn pause(&mut self) -> RecordResult<()> {
        if self.state != RecordingState::Recording {
            return Err(RecordError::NotRecording);
        }

        let end_time = self.process_time_ms();
        if let Some(channel) = self.channel.as_mut() {
            channel.pause().await?;
        }
        if let Some(segment) = self.segments.last_mut() {
            segment.end(end_time);
        }

        self.state = RecordingState::Paused;
        let _ = self.event_tx.send(SessionEvent::Paused);

        tracing::info!("Recording paused");
        Ok(())
    }

    /// Resume recording after a pause
    pub async fn resume(&mut self) -> RecordResult<()> {
        match self.state {
            RecordingState::Paused => {}
            RecordingState::Recording => return Err(RecordError::AlreadyRecording),
            _ => return Err(RecordError::NotRecording),
        }

        if let Some(channel) = self.channel.as_mut() {
            channel.resume().await?;
        }

        let index = self.segments.len();
        self.segments
            .push(RecordingSegment::new(index, self.process_time_ms()));

        self.state = RecordingState::Recording;
        let _ = self.event_tx.send(SessionEvent::Resumed);

        tracing::info!("Recording resumed");
        Ok(())
    }

    /// Stop recording and finalize the output file
    pub async fn stop(&mut self) -> RecordResult<RecordingOutcome> {
        if !matches!(
            self.state,
            RecordingState::Recording | RecordingState::Paused
        ) {
            return Err(RecordError::NotRecording);
        }

        tracing::info!("Stopping recording");
        let was_recording = self.state == RecordingState::Recording;
        self.state = RecordingState::Stopping;

        // A pause already closed the open segment; a direct stop has not.
        if was_recording {
            let end_time = self.process_time_ms();
            if let Some(segment) = self.segments.last_mut() {
                segment.end(end_time);
            }
        }

        // The channel is consumed by finalization either way.
        let mut channel = self.channel.take();
        let result = match channel.as_mut() {
            Some(channel) => channel.stop().await,
            None => Err(RecordError::NotRecording),
        };

        self.state = RecordingState::Idle;
        self.start_time = None;

        match result {
            Ok(output_path) => {
                let duration_ms: f64 = self.segments.iter().map(|s| s.duration_ms).sum();
                let outcome = RecordingOutcome {
                    output_path: output_path.to_string_lossy().to_string(),
                    duration_ms,
                    segment_count: self.segments.len(),
                };

                let _ = self
                    .event_tx
                    .send(SessionEvent::Stopped(outcome.output_path.clone()));
                tracing::info!(
                    "Recording stopped. Duration: {}ms, output: {}",
                    outcome.duration_ms,
                    outcome.output_path
                );
                Ok(outcome)
            }
            Err(err) => {
                let _ = self.event_tx.send(SessionEvent::Error(err.to_string()));
                tracing::error!("Failed to finalize recording: {err}");
                Err(err)
            }
        }
    }

    /// Get recorded duration in milliseconds, excluding paused time
    pub fn duration_ms(&self) -> f64 {
        let completed: f64 = self
            .segments
            .iter()
            .take(self.segments.len().saturating_sub(1))
            .map(|s| s.duration_ms)
            .sum();

        let current = if self.state == RecordingState::Recording {
            self.segments
                .last()
                .map(|s| self.process_time_ms() - s.process_time_start_ms)
                .unwrap_or(0.0)
        } else {
            self.segments.last().map(|s| s.duration_ms).unwrap_or(0.0)
        };

        completed + current
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::state::{ContainerFormat, VideoCodec};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Scripted channel standing in for camera + encoder
    struct MockChannel {
        fail_initialize: bool,
        fail_stop: bool,
        active: Arc<AtomicBool>,
        output_path: Option<PathBuf>,
    }

    impl MockChannel {
        fn new() -> Self {
            Self {
                fail_initialize: false,
                fail_stop: false,
                active: Arc::new(AtomicBool::new(false)),
                output_path: None,
            }
        }

        fn failing_initialize() -> Self {
            Self {
                fail_initialize: true,
                ..Self::new()
            }
        }

        fn failing_stop() -> Self {
            Self {
                fail_stop: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl CaptureChannel for MockChannel {
        fn id(&self) -> &str {
            "mock"
        }

        async fn initialize(
            &mut self,
            output_path: &Path,
            _format: &RecordingFormat,
        ) -> RecordResult<()> {
            if self.fail_initialize {
                return Err(RecordError::DeviceUnavailable("no cameras found".into()));
            }
            self.output_path = Some(output_path.to_path_buf());
            Ok(())
        }

        async fn start(&mut self) -> RecordResult<()> {
            self.active.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn pause(&mut self) -> RecordResult<()> {
            self.active.store(false, Ordering::SeqCst);
            Ok(())
        }

        async fn resume(&mut self) -> RecordResult<()> {
            self.active.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&mut self) -> RecordResult<PathBuf> {
            self.active.store(false, Ordering::SeqCst);
            if self.fail_stop {
                return Err(RecordError::WriteFailed("container flush failed".into()));
            }
            Ok(self.output_path.clone().expect("initialize not called"))
        }

        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }
    }

    fn configured_session() -> RecordingSession {
        let mut session = RecordingSession::new();
        session
            .configure(RecordingFormat::default())
            .expect("default format should be supported");
        session
    }

    #[tokio::test]
    async fn start_before_configure_fails_with_no_format() {
        let mut session = RecordingSession::new();
        session.attach_channel(Box::new(MockChannel::new())).unwrap();

        let err = session.start().await.unwrap_err();
        assert!(matches!(err, RecordError::NoFormat));
        assert_eq!(session.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn start_without_channel_fails_with_device_unavailable() {
        let mut session = configured_session();

        let err = session.start().await.unwrap_err();
        assert!(matches!(err, RecordError::DeviceUnavailable(_)));
        assert_eq!(session.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn device_probe_failure_surfaces_and_stays_idle() {
        let mut session = configured_session();
        session
            .attach_channel(Box::new(MockChannel::failing_initialize()))
            .unwrap();

        let err = session.start().await.unwrap_err();
        assert!(matches!(err, RecordError::DeviceUnavailable(_)));
        assert_eq!(session.state(), RecordingState::Idle);
    }

    #[test]
    fn unsupported_format_is_rejected_and_state_unchanged() {
        let mut session = RecordingSession::new();
        let err = session
            .configure(RecordingFormat::new(VideoCodec::Vp9, ContainerFormat::Mpeg4))
            .unwrap_err();

        assert!(matches!(err, ConfigError::Unsupported { .. }));
        assert_eq!(session.state(), RecordingState::Idle);
        assert_eq!(session.format(), None);
    }

    #[tokio::test]
    async fn configure_while_recording_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = configured_session();
        session.set_output_dir(dir.path().to_path_buf());
        session.attach_channel(Box::new(MockChannel::new())).unwrap();
        session.start().await.unwrap();

        let err = session
            .configure(RecordingFormat::new(
                VideoCodec::H264,
                ContainerFormat::Matroska,
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SessionBusy(RecordingState::Recording)
        ));

        // The applied format is untouched.
        assert_eq!(session.format(), Some(RecordingFormat::default()));
    }

    #[tokio::test]
    async fn stop_from_idle_is_a_reported_noop() {
        let mut session = configured_session();

        let err = session.stop().await.unwrap_err();
        assert!(matches!(err, RecordError::NotRecording));
        assert_eq!(session.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn double_pause_stays_paused_and_reports_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = configured_session();
        session.set_output_dir(dir.path().to_path_buf());
        session.attach_channel(Box::new(MockChannel::new())).unwrap();
        session.start().await.unwrap();

        session.pause().await.unwrap();
        assert_eq!(session.state(), RecordingState::Paused);

        let err = session.pause().await.unwrap_err();
        assert!(matches!(err, RecordError::NotRecording));
        assert_eq!(session.state(), RecordingState::Paused);
    }

    #[tokio::test]
    async fn full_lifecycle_produces_outcome_and_events() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = configured_session();
        session.set_output_dir(dir.path().to_path_buf());
        session.attach_channel(Box::new(MockChannel::new())).unwrap();

        let mut events = session.subscribe();

        session.start().await.unwrap();
        assert_eq!(session.state(), RecordingState::Recording);

        session.pause().await.unwrap();
        session.resume().await.unwrap();

        let outcome = session.stop().await.unwrap();
        assert_eq!(session.state(), RecordingState::Idle);
        assert_eq!(outcome.segment_count, 2);
        assert!(outcome.output_path.ends_with(".mp4"));
        assert!(outcome.output_path.starts_with(dir.path().to_str().unwrap()));

        assert!(matches!(events.try_recv().unwrap(), SessionEvent::Started));
        assert!(matches!(events.try_recv().unwrap(), SessionEvent::Paused));
        assert!(matches!(events.try_recv().unwrap(), SessionEvent::Resumed));
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::Stopped(_)
        ));
    }

    #[tokio::test]
    async fn finalize_failure_surfaces_write_failed() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = configured_session();
        session.set_output_dir(dir.path().to_path_buf());
        session
            .attach_channel(Box::new(MockChannel::failing_stop()))
            .unwrap();
        session.start().await.unwrap();

        let err = session.stop().await.unwrap_err();
        assert!(matches!(err, RecordError::WriteFailed(_)));

        // The attempt is over; the session is reusable.
        assert_eq!(session.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn restart_after_stop_uses_a_fresh_channel() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = configured_session();
        session.set_output_dir(dir.path().to_path_buf());
        session.attach_channel(Box::new(MockChannel::new())).unwrap();
        session.start().await.unwrap();
        session.stop().await.unwrap();

        // The channel was released at stop; starting again requires a new one.
        let err = session.start().await.unwrap_err();
        assert!(matches!(err, RecordError::DeviceUnavailable(_)));

        session.attach_channel(Box::new(MockChannel::new())).unwrap();
        session.start().await.unwrap();
        assert_eq!(session.state(), RecordingState::Recording);
    }
}
