//! Capture type definitions
//!
//! Device and capture descriptions shared with the frontend.

use serde::{Deserialize, Serialize};

/// Information about a camera
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    /// Unique device ID
    pub id: String,

    /// Device name
    pub name: String,

    /// Supported resolutions
    pub supported_resolutions: Vec<Resolution>,
}

/// Video resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Capture parameters for starting a recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConfig {
    /// Camera device ID to capture from (None = default camera)
    pub device_id: Option<String>,

    /// Requested capture width in pixels
    pub width: u32,

    /// Requested capture height in pixels
    pub height: u32,

    /// Requested frame rate
    pub fps: u32,

    /// Directory to write the recording into (None = system default)
    pub output_dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_config_accepts_camel_case_wire_format() {
        let json = r#"{
            "deviceId": "0",
            "width": 1280,
            "height": 720,
            "fps": 30,
            "outputDir": null
        }"#;

        let config: CaptureConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.device_id.as_deref(), Some("0"));
        assert_eq!(config.width, 1280);
        assert_eq!(config.output_dir, None);
    }
}
