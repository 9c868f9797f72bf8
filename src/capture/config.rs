//! Capture session configuration.
//!
//! The ideal/fallback height pair mirrors what document cameras can
//! usually deliver: 1080p when the sensor supports it, 720p otherwise.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Preferred camera height in pixels.
pub const IDEAL_CAMERA_HEIGHT_IN_PX: u32 = 1080;

/// Height requested when the ideal one is not supported.
pub const FALLBACK_HEIGHT_IN_PX: u32 = 720;

/// Longest accepted inactivity window, in seconds.
pub const MAX_WATCHDOG_SECS: u64 = 3600;

/// Which way the requested camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Rear camera, pointed at the document.
    Environment,
    /// Front camera.
    User,
}

/// How camera permission is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionMode {
    /// Negotiate with the real device.
    Negotiate,
    /// Assume permission was granted; never touches the device.
    PreGranted,
}

/// Configuration for one capture session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera device index.
    pub device_id: u32,
    /// Facing hint passed to the device layer.
    pub facing: Facing,
    /// Preferred frame height in pixels.
    pub ideal_height: u32,
    /// Frame height used when the preferred one is unavailable.
    pub fallback_height: u32,
    /// MIME type requested for grabbed frames.
    pub mime_type: String,
    /// Inactivity window in seconds.
    pub watchdog_secs: u64,
    /// Document type identifier, e.g. `passport` or `driving_licence`.
    pub document_type: Option<String>,
    /// Permission negotiation strategy.
    pub permission_mode: PermissionMode,
    /// Whether the manual upload fallback is unavailable to the user.
    pub upload_fallback_disabled: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            facing: Facing::Environment,
            ideal_height: IDEAL_CAMERA_HEIGHT_IN_PX,
            fallback_height: FALLBACK_HEIGHT_IN_PX,
            mime_type: "image/jpeg".to_string(),
            watchdog_secs: 10,
            document_type: None,
            permission_mode: PermissionMode::Negotiate,
            upload_fallback_disabled: false,
        }
    }
}

impl CaptureConfig {
    /// Creates a configuration for the given document type.
    pub fn for_document(document_type: impl Into<String>) -> Self {
        Self {
            document_type: Some(document_type.into()),
            ..Default::default()
        }
    }

    /// Returns the inactivity window as a duration.
    pub fn watchdog_duration(&self) -> Duration {
        Duration::from_secs(self.watchdog_secs)
    }

    /// Frame heights to try, best first.
    pub fn height_candidates(&self) -> [u32; 2] {
        [self.ideal_height, self.fallback_height]
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ideal_height == 0 || self.fallback_height == 0 {
            return Err(ConfigError::InvalidHeight);
        }
        if self.fallback_height > self.ideal_height {
            return Err(ConfigError::FallbackAboveIdeal {
                ideal: self.ideal_height,
                fallback: self.fallback_height,
            });
        }
        if self.watchdog_secs == 0 || self.watchdog_secs > MAX_WATCHDOG_SECS {
            return Err(ConfigError::InvalidWatchdog(self.watchdog_secs));
        }
        match self.mime_type.split_once('/') {
            Some(("image", subtype)) if !subtype.is_empty() => Ok(()),
            _ => Err(ConfigError::InvalidMimeType(self.mime_type.clone())),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// A height is zero.
    #[error("invalid frame height")]
    InvalidHeight,
    /// The fallback height is larger than the ideal one.
    #[error("fallback height {fallback} exceeds ideal height {ideal}")]
    FallbackAboveIdeal {
        /// Configured ideal height.
        ideal: u32,
        /// Configured fallback height.
        fallback: u32,
    },
    /// The inactivity window is outside `1..=MAX_WATCHDOG_SECS`.
    #[error("watchdog window of {0}s is outside 1..={max}s", max = MAX_WATCHDOG_SECS)]
    InvalidWatchdog(u64),
    /// The capture MIME type is not an `image/*` type.
    #[error("unsupported capture mime type: {0}")]
    InvalidMimeType(String),
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Session settings.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// CLI output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where and how the CLI stores results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory captured blobs are written to.
    pub directory: PathBuf,
    /// Delay before the CLI presses the capture button, in milliseconds.
    pub capture_after_ms: u64,
    /// Print Prometheus metrics when the session ends.
    pub print_metrics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            capture_after_ms: 500,
            print_metrics: false,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.capture.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.watchdog_duration(), Duration::from_secs(10));
        assert_eq!(config.height_candidates(), [1080, 720]);
    }

    #[test]
    fn test_fallback_above_ideal_invalid() {
        let mut config = CaptureConfig::default();
        config.fallback_height = 2160;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FallbackAboveIdeal { .. })
        ));
    }

    #[test]
    fn test_non_image_mime_invalid() {
        let mut config = CaptureConfig::default();
        config.mime_type = "text/plain".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMimeType(_))
        ));
    }

    #[test]
    fn test_toml_overrides() {
        let config = FileConfig::from_toml(
            r#"
            [capture]
            document_type = "driving_licence"
            permission_mode = "pre_granted"
            watchdog_secs = 4

            [output]
            capture_after_ms = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.capture.document_type.as_deref(), Some("driving_licence"));
        assert_eq!(config.capture.permission_mode, PermissionMode::PreGranted);
        assert_eq!(config.capture.watchdog_secs, 4);
        assert_eq!(config.capture.ideal_height, IDEAL_CAMERA_HEIGHT_IN_PX);
        assert_eq!(config.output.capture_after_ms, 50);
    }

    #[test]
    fn test_toml_rejects_zero_watchdog() {
        let result = FileConfig::from_toml("[capture]\nwatchdog_secs = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidWatchdog(0))));
    }

    #[test]
    fn test_overlong_watchdog_invalid() {
        let mut config = CaptureConfig::default();
        config.watchdog_secs = MAX_WATCHDOG_SECS;
        assert!(config.validate().is_ok());

        config.watchdog_secs = MAX_WATCHDOG_SECS + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWatchdog(_))
        ));

        config.watchdog_secs = u64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWatchdog(u64::MAX))
        ));
    }
}
