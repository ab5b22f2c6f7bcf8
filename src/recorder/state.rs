//! Recording state and format types
//!
//! Defines the recording state machine, the output format model, and the
//! session bookkeeping shared with the frontend.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current state of the recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    Idle,
    /// Currently recording
    Recording,
    /// Recording is paused
    Paused,
    /// Recording is being finalized
    Stopping,
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            RecordingState::Idle => "idle",
            RecordingState::Recording => "recording",
            RecordingState::Paused => "paused",
            RecordingState::Stopping => "stopping",
        };
        write!(f, "{name}")
    }
}

/// Video codec for the encoded stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    H264,
    Hevc,
    Vp9,
}

impl VideoCodec {
    pub fn all() -> [VideoCodec; 3] {
        [VideoCodec::H264, VideoCodec::Hevc, VideoCodec::Vp9]
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            VideoCodec::H264 => "h264",
            VideoCodec::Hevc => "hevc",
            VideoCodec::Vp9 => "vp9",
        };
        write!(f, "{name}")
    }
}

/// Container format holding the encoded stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Mpeg4,
    Matroska,
    Webm,
}

impl ContainerFormat {
    pub fn all() -> [ContainerFormat; 3] {
        [
            ContainerFormat::Mpeg4,
            ContainerFormat::Matroska,
            ContainerFormat::Webm,
        ]
    }

    /// File extension for this container
    pub fn extension(&self) -> &'static str {
        match self {
            ContainerFormat::Mpeg4 => "mp4",
            ContainerFormat::Matroska => "mkv",
            ContainerFormat::Webm => "webm",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ContainerFormat::Mpeg4 => "mp4",
            ContainerFormat::Matroska => "matroska",
            ContainerFormat::Webm => "webm",
        };
        write!(f, "{name}")
    }
}

/// Target output format for a recording session
///
/// Immutable once applied; `RecordingSession::configure` rejects unsupported
/// pairs before any capture begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingFormat {
    pub video_codec: VideoCodec,
    pub container: ContainerFormat,
}

impl RecordingFormat {
    pub fn new(video_codec: VideoCodec, container: ContainerFormat) -> Self {
        Self {
            video_codec,
            container,
        }
    }

    /// Whether the backend can encode this codec into this container
    pub fn is_supported(&self) -> bool {
        matches!(
            (self.video_codec, self.container),
            (VideoCodec::H264, ContainerFormat::Mpeg4)
                | (VideoCodec::H264, ContainerFormat::Matroska)
                | (VideoCodec::Hevc, ContainerFormat::Mpeg4)
                | (VideoCodec::Hevc, ContainerFormat::Matroska)
                | (VideoCodec::Vp9, ContainerFormat::Matroska)
                | (VideoCodec::Vp9, ContainerFormat::Webm)
        )
    }

    /// Every codec/container pair the backend accepts
    pub fn supported_formats() -> Vec<RecordingFormat> {
        let mut formats = Vec::new();
        for codec in VideoCodec::all() {
            for container in ContainerFormat::all() {
                let format = RecordingFormat::new(codec, container);
                if format.is_supported() {
                    formats.push(format);
                }
            }
        }
        formats
    }

    /// File name for a recording started now, e.g. `recording-20260808-143000.mp4`
    pub fn output_file_name(&self) -> String {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        format!("recording-{stamp}.{}", self.container.extension())
    }
}

impl Default for RecordingFormat {
    fn default() -> Self {
        Self::new(VideoCodec::H264, ContainerFormat::Mpeg4)
    }
}

/// Bookkeeping for one recorded stretch between pause points
///
/// A new segment is opened on start and on every resume. Segments only feed
/// duration reporting; the whole session still writes a single output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSegment {
    /// Segment index (0, 1, 2, ...)
    pub index: usize,

    /// Duration of this segment in milliseconds
    pub duration_ms: f64,

    /// Process time when the segment started (relative to recording start)
    pub process_time_start_ms: f64,

    /// Process time when the segment ended
    pub process_time_end_ms: f64,
}

impl RecordingSegment {
    /// Open a new segment starting now
    pub fn new(index: usize, process_time_ms: f64) -> Self {
        Self {
            index,
            duration_ms: 0.0,
            process_time_start_ms: process_time_ms,
            process_time_end_ms: process_time_ms,
        }
    }

    /// Close the segment
    pub fn end(&mut self, process_time_ms: f64) {
        self.process_time_end_ms = process_time_ms;
        self.duration_ms = self.process_time_end_ms - self.process_time_start_ms;
    }
}

/// Result of a completed recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingOutcome {
    /// Path to the finalized container file
    pub output_path: String,

    /// Recorded duration in milliseconds, excluding paused time
    pub duration_ms: f64,

    /// Number of recorded segments (pause/resume cycles + 1)
    pub segment_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_is_h264_mp4() {
        let format = RecordingFormat::default();
        assert_eq!(format.video_codec, VideoCodec::H264);
        assert_eq!(format.container, ContainerFormat::Mpeg4);
        assert!(format.is_supported());
    }

    #[test]
    fn vp9_in_mp4_is_rejected() {
        let format = RecordingFormat::new(VideoCodec::Vp9, ContainerFormat::Mpeg4);
        assert!(!format.is_supported());
    }

    #[test]
    fn supported_formats_match_the_table() {
        let formats = RecordingFormat::supported_formats();
        assert_eq!(formats.len(), 6);
        assert!(formats.iter().all(|f| f.is_supported()));
    }

    #[test]
    fn output_file_name_uses_container_extension() {
        let format = RecordingFormat::new(VideoCodec::Vp9, ContainerFormat::Webm);
        let name = format.output_file_name();
        assert!(name.starts_with("recording-"));
        assert!(name.ends_with(".webm"));
    }

    #[test]
    fn format_serializes_camel_case() {
        let format = RecordingFormat::default();
        let json = serde_json::to_string(&format).unwrap();
        assert_eq!(json, r#"{"videoCodec":"h264","container":"mpeg4"}"#);
    }

    #[test]
    fn segment_duration_tracks_end() {
        let mut segment = RecordingSegment::new(0, 100.0);
        segment.end(1600.0);
        assert_eq!(segment.duration_ms, 1500.0);
    }
}
