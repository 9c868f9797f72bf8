//! Media device abstraction for frame grabbing.
//!
//! This module provides a trait-based abstraction over the live video
//! device, allowing for both real camera input and a scriptable mock
//! for tests and demos.

use super::{CaptureConfig, Frame, SdkMetadata};
use thiserror::Error;

/// Errors that can occur during device operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// No camera at the requested index.
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    /// Access refused by the user or platform.
    #[error("camera permission denied")]
    PermissionDenied,
    /// The backend failed to open the stream.
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    /// Neither the ideal nor the fallback height is supported.
    #[error("no supported resolution (tried heights {tried:?})")]
    UnsupportedResolution {
        /// Heights attempted, best first.
        tried: Vec<u32>,
    },
    /// A frame request failed.
    #[error("failed to grab frame: {0}")]
    CaptureFailed(String),
    /// The stream went away.
    #[error("camera disconnected")]
    Disconnected,
    /// A frame was requested before `open`.
    #[error("camera not initialized")]
    NotInitialized,
}

/// Outcome of a frame request.
#[derive(Debug)]
pub enum FrameGrab {
    /// The device produced the frame synchronously.
    Ready(Frame),
    /// The frame will be delivered later through the session's
    /// `on_frame` entry point.
    Pending,
}

/// Trait for live video devices.
pub trait MediaDevice {
    /// Opens the stream, trying the ideal height and then the fallback.
    ///
    /// Returns the height actually negotiated.
    fn open(&mut self, config: &CaptureConfig) -> Result<u32, DeviceError>;

    /// Requests one still frame encoded as `mime_type`.
    fn request_frame(&mut self, mime_type: &str) -> Result<FrameGrab, DeviceError>;

    /// Abandons an outstanding [`FrameGrab::Pending`] request.
    fn cancel_pending(&mut self) {}

    /// Checks if the stream is currently open.
    fn is_open(&self) -> bool;

    /// Stops the stream and releases resources.
    fn close(&mut self);
}

impl<D: MediaDevice + ?Sized> MediaDevice for Box<D> {
    fn open(&mut self, config: &CaptureConfig) -> Result<u32, DeviceError> {
        (**self).open(config)
    }

    fn request_frame(&mut self, mime_type: &str) -> Result<FrameGrab, DeviceError> {
        (**self).request_frame(mime_type)
    }

    fn cancel_pending(&mut self) {
        (**self).cancel_pending()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Mock device that produces synthetic JPEG-framed buffers.
///
/// Behaviour is scripted through the builder methods: resolution limits,
/// permission denial, deferred delivery and grab failures.
#[derive(Debug, Default)]
pub struct MockDevice {
    height: Option<u32>,
    max_height: Option<u32>,
    deny_permission: bool,
    deferred: bool,
    fail_next_grab: Option<DeviceError>,
    pending: bool,
    sequence: u64,
    open_calls: u32,
    frames_requested: u32,
}

impl MockDevice {
    /// Mock that opens at any height and grabs synchronously.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the heights the mock accepts.
    pub fn with_max_height(mut self, max_height: u32) -> Self {
        self.max_height = Some(max_height);
        self
    }

    /// Makes `open` fail with [`DeviceError::PermissionDenied`].
    pub fn denying_permission(mut self) -> Self {
        self.deny_permission = true;
        self
    }

    /// Makes `request_frame` answer [`FrameGrab::Pending`].
    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// Makes the next `request_frame` fail with `error`.
    pub fn fail_next_grab(&mut self, error: DeviceError) {
        self.fail_next_grab = Some(error);
    }

    /// Number of times `open` was called.
    pub fn open_calls(&self) -> u32 {
        self.open_calls
    }

    /// Number of frames requested so far.
    pub fn frames_requested(&self) -> u32 {
        self.frames_requested
    }

    /// Height negotiated by the last successful `open`.
    pub fn active_height(&self) -> Option<u32> {
        self.height
    }

    /// True while a deferred request is outstanding.
    pub fn has_pending(&self) -> bool {
        self.pending
    }

    /// Builds the frame a deferred request would deliver.
    pub fn synthesize(&mut self, mime_type: &str) -> Frame {
        self.sequence += 1;
        let height = self.height.unwrap_or_default();

        // SOI marker, a deterministic body, EOI marker. Not a decodable
        // image, only enough to look like one in logs and files.
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend((0..64u64).map(|i| ((i ^ self.sequence) % 256) as u8));
        bytes.extend([0xFF, 0xD9]);

        let mut metadata = SdkMetadata::now();
        metadata.device_label = Some("MockDevice".to_string());
        metadata
            .extra
            .insert("sequence".to_string(), self.sequence.to_string());
        metadata
            .extra
            .insert("height".to_string(), height.to_string());

        Frame::new(bytes, metadata, mime_type)
    }
}

impl MediaDevice for MockDevice {
    fn open(&mut self, config: &CaptureConfig) -> Result<u32, DeviceError> {
        self.open_calls += 1;
        if self.deny_permission {
            return Err(DeviceError::PermissionDenied);
        }

        let candidates = config.height_candidates();
        let height = candidates
            .iter()
            .copied()
            .find(|h| self.max_height.map_or(true, |max| *h <= max))
            .ok_or_else(|| DeviceError::UnsupportedResolution {
                tried: candidates.to_vec(),
            })?;

        self.height = Some(height);
        self.sequence = 0;
        tracing::info!(height, facing = ?config.facing, "MockDevice opened");
        Ok(height)
    }

    fn request_frame(&mut self, mime_type: &str) -> Result<FrameGrab, DeviceError> {
        if self.height.is_none() {
            return Err(DeviceError::NotInitialized);
        }
        self.frames_requested += 1;
        if let Some(error) = self.fail_next_grab.take() {
            return Err(error);
        }

        if self.deferred {
            self.pending = true;
            return Ok(FrameGrab::Pending);
        }
        Ok(FrameGrab::Ready(self.synthesize(mime_type)))
    }

    fn cancel_pending(&mut self) {
        if self.pending {
            tracing::debug!("MockDevice pending grab cancelled");
        }
        self.pending = false;
    }

    fn is_open(&self) -> bool {
        self.height.is_some()
    }

    fn close(&mut self) {
        self.height = None;
        self.pending = false;
        tracing::info!("MockDevice closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_device_lifecycle() {
        let mut device = MockDevice::new();
        let config = CaptureConfig::default();

        assert!(!device.is_open());
        assert_eq!(device.open(&config).unwrap(), 1080);
        assert!(device.is_open());

        let frame = match device.request_frame("image/jpeg").unwrap() {
            FrameGrab::Ready(frame) => frame,
            FrameGrab::Pending => panic!("mock should deliver synchronously"),
        };
        assert_eq!(&frame.bytes()[..2], &[0xFF, 0xD8]);
        assert_eq!(frame.metadata().extra.get("sequence").map(String::as_str), Some("1"));

        device.close();
        assert!(!device.is_open());
    }

    #[test]
    fn test_request_without_open() {
        let mut device = MockDevice::new();
        assert!(matches!(
            device.request_frame("image/jpeg"),
            Err(DeviceError::NotInitialized)
        ));
    }

    #[test]
    fn test_falls_back_to_lower_height() {
        let mut device = MockDevice::new().with_max_height(720);
        assert_eq!(device.open(&CaptureConfig::default()).unwrap(), 720);
        assert_eq!(device.active_height(), Some(720));
    }

    #[test]
    fn test_no_supported_height() {
        let mut device = MockDevice::new().with_max_height(480);
        assert_eq!(
            device.open(&CaptureConfig::default()),
            Err(DeviceError::UnsupportedResolution {
                tried: vec![1080, 720]
            })
        );
    }

    #[test]
    fn test_deferred_grab_can_be_cancelled() {
        let mut device = MockDevice::new().deferred();
        device.open(&CaptureConfig::default()).unwrap();

        assert!(matches!(
            device.request_frame("image/jpeg").unwrap(),
            FrameGrab::Pending
        ));
        assert!(device.has_pending());

        device.cancel_pending();
        assert!(!device.has_pending());
    }

    #[test]
    fn test_scripted_grab_failure() {
        let mut device = MockDevice::new();
        device.open(&CaptureConfig::default()).unwrap();
        device.fail_next_grab(DeviceError::Disconnected);

        assert_eq!(
            device.request_frame("image/jpeg").unwrap_err(),
            DeviceError::Disconnected
        );
        assert!(device.request_frame("image/jpeg").is_ok());
    }
}
