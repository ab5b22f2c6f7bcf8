//! Camera capture backend
//!
//! This module provides camera enumeration, the capture channel feeding the
//! FFmpeg encoder, and one-shot snapshot capture.

pub mod camera;
pub mod encoder;
pub mod traits;

pub use camera::{capture_snapshot, list_cameras, CameraCaptureChannel};
pub use traits::{CameraInfo, CaptureConfig, Resolution};
