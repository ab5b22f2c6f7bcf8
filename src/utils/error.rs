//! Error types and handling
//!
//! Command-boundary error shape shared with the frontend.

use serde::{Deserialize, Serialize};

use crate::recorder::error::{ConfigError, RecordError};

/// Error response for frontend
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    fn new(code: &str, message: String) -> Self {
        Self {
            code: code.to_string(),
            message,
        }
    }
}

impl From<ConfigError> for ErrorResponse {
    fn from(error: ConfigError) -> Self {
        let code = match &error {
            ConfigError::Unsupported { .. } => "FORMAT_UNSUPPORTED",
            ConfigError::SessionBusy(_) => "SESSION_BUSY",
        };
        ErrorResponse::new(code, error.to_string())
    }
}

impl From<RecordError> for ErrorResponse {
    fn from(error: RecordError) -> Self {
        let code = match &error {
            RecordError::DeviceUnavailable(_) => "DEVICE_UNAVAILABLE",
            RecordError::NoFormat => "NO_FORMAT",
            RecordError::WriteFailed(_) => "WRITE_FAILED",
            RecordError::AlreadyRecording => "ALREADY_RECORDING",
            RecordError::NotRecording => "NOT_RECORDING",
            RecordError::Encoder(_) => "ENCODER_ERROR",
            RecordError::Io(_) => "IO_ERROR",
        };
        ErrorResponse::new(code, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::state::{ContainerFormat, VideoCodec};

    #[test]
    fn record_error_maps_to_stable_codes() {
        let response = ErrorResponse::from(RecordError::NoFormat);
        assert_eq!(response.code, "NO_FORMAT");
        assert!(!response.message.is_empty());
    }

    #[test]
    fn config_error_serializes_for_the_frontend() {
        let response = ErrorResponse::from(ConfigError::Unsupported {
            codec: VideoCodec::H264,
            container: ContainerFormat::Webm,
        });
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("FORMAT_UNSUPPORTED"));
    }
}
