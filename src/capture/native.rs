//! Hardware camera backed by `nokhwa`.
//!
//! Only MJPEG streams are supported: their buffers are already JPEG
//! files, so a grabbed frame can be handed over without re-encoding.

use super::{CaptureConfig, DeviceError, Frame, FrameGrab, MediaDevice, SdkMetadata};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::{Camera, NokhwaError};

/// Width requested for a given height, assuming a 16:9 sensor.
fn width_for(height: u32) -> u32 {
    height * 16 / 9
}

/// Live camera opened through the platform's native backend.
#[derive(Default)]
pub struct NativeDevice {
    camera: Option<Camera>,
}

impl NativeDevice {
    /// Device 0, not yet opened.
    pub fn new() -> Self {
        Self::default()
    }

    fn try_open(index: u32, height: u32) -> Result<Camera, NokhwaError> {
        let format = CameraFormat::new(
            Resolution::new(width_for(height), height),
            FrameFormat::MJPEG,
            30,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Exact(format));
        let mut camera = Camera::new(CameraIndex::Index(index), requested)?;
        camera.open_stream()?;
        Ok(camera)
    }
}

fn map_open_error(error: NokhwaError) -> DeviceError {
    match error {
        NokhwaError::OpenDeviceError(device, reason) => {
            if reason.to_lowercase().contains("permission") {
                DeviceError::PermissionDenied
            } else {
                DeviceError::OpenFailed(format!("{device}: {reason}"))
            }
        }
        NokhwaError::NotImplementedError(what) => DeviceError::DeviceNotFound(what),
        other => DeviceError::OpenFailed(other.to_string()),
    }
}

impl MediaDevice for NativeDevice {
    fn open(&mut self, config: &CaptureConfig) -> Result<u32, DeviceError> {
        let mut last_error = None;
        for height in config.height_candidates() {
            match Self::try_open(config.device_id, height) {
                Ok(camera) => {
                    tracing::info!(
                        device = config.device_id,
                        height,
                        facing = ?config.facing,
                        "Native camera opened"
                    );
                    self.camera = Some(camera);
                    return Ok(height);
                }
                Err(e) => {
                    tracing::debug!(height, error = %e, "Camera rejected height");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e @ NokhwaError::OpenDeviceError(..)) => Err(map_open_error(e)),
            _ => Err(DeviceError::UnsupportedResolution {
                tried: config.height_candidates().to_vec(),
            }),
        }
    }

    fn request_frame(&mut self, mime_type: &str) -> Result<FrameGrab, DeviceError> {
        let camera = self.camera.as_mut().ok_or(DeviceError::NotInitialized)?;
        if mime_type != "image/jpeg" {
            return Err(DeviceError::CaptureFailed(format!(
                "cannot produce {mime_type} from an MJPEG stream"
            )));
        }

        let buffer = camera
            .frame()
            .map_err(|e| DeviceError::CaptureFailed(e.to_string()))?;
        if buffer.source_frame_format() != FrameFormat::MJPEG {
            return Err(DeviceError::CaptureFailed(format!(
                "unexpected frame format {}",
                buffer.source_frame_format()
            )));
        }

        let mut metadata = SdkMetadata::now();
        metadata.device_label = Some(camera.info().human_name());
        let resolution = buffer.resolution();
        metadata
            .extra
            .insert("resolution".to_string(), resolution.to_string());

        Ok(FrameGrab::Ready(Frame::new(
            buffer.buffer().to_vec(),
            metadata,
            mime_type,
        )))
    }

    fn is_open(&self) -> bool {
        self.camera.is_some()
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                tracing::warn!(error = %e, "Failed to stop camera stream");
            }
            tracing::info!("Native camera closed");
        }
    }
}
