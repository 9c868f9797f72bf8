//! Camera device access and frame handling.
//!
//! This module provides the device-side contract the capture session
//! consumes: opening a live stream, grabbing single frames, and the
//! configuration that drives both. Real hardware lives behind the
//! `camera` feature; everything else runs against [`MockDevice`].

mod config;
mod device;
mod frame;
#[cfg(feature = "camera")]
mod native;

pub use config::{
    CaptureConfig, ConfigError, Facing, FileConfig, OutputConfig, PermissionMode,
    FALLBACK_HEIGHT_IN_PX, IDEAL_CAMERA_HEIGHT_IN_PX, MAX_WATCHDOG_SECS,
};
pub use device::{DeviceError, FrameGrab, MediaDevice, MockDevice};
pub use frame::{mime_extension, Frame, SdkMetadata};
#[cfg(feature = "camera")]
pub use native::NativeDevice;
