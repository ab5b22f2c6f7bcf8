//! Recording system module
//!
//! This module implements the single-session recording architecture:
//! - CaptureChannel trait for the capture backend
//! - RecordingSession controller driving the lifecycle state machine
//! - Format and error types shared with the frontend

pub mod channel;
pub mod error;
pub mod session;
pub mod state;

pub use channel::CaptureChannel;
pub use error::{BootstrapError, ConfigError, RecordError, RecordResult};
pub use session::{RecordingSession, SessionEvent};
pub use state::{ContainerFormat, RecordingFormat, RecordingOutcome, RecordingState, VideoCodec};
