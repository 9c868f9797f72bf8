//! Session error taxonomy.

use crate::capture::DeviceError;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to the host and the error-rendering slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Camera failure. Fatal to the session.
    #[error("camera not working: {reason}")]
    Device {
        /// Human-readable cause.
        reason: String,
    },

    /// Nothing was captured before the watchdog expired. Dismissible.
    #[error("camera inactive (upload fallback available: {fallback_available})")]
    Inactivity {
        /// Whether the user can still upload a photo instead.
        fallback_available: bool,
    },

    /// The user or platform refused camera access.
    #[error("camera permission denied")]
    PermissionDenied,
}

impl CaptureError {
    /// Builds the inactivity variant for the given fallback setting.
    pub fn inactivity(upload_fallback_disabled: bool) -> Self {
        CaptureError::Inactivity {
            fallback_available: !upload_fallback_disabled,
        }
    }

    /// Stable identifier the host uses to pick copy and actions.
    pub fn code(&self) -> &'static str {
        match self {
            CaptureError::Device { .. } => "CAMERA_NOT_WORKING",
            CaptureError::Inactivity {
                fallback_available: true,
            } => "CAMERA_INACTIVE",
            CaptureError::Inactivity {
                fallback_available: false,
            } => "CAMERA_INACTIVE_NO_FALLBACK",
            CaptureError::PermissionDenied => "CAMERA_PERMISSION_DENIED",
        }
    }

    /// Only inactivity can be dismissed; the rest need a new session.
    pub fn is_dismissible(&self) -> bool {
        matches!(self, CaptureError::Inactivity { .. })
    }
}

impl From<DeviceError> for CaptureError {
    fn from(e: DeviceError) -> Self {
        match e {
            DeviceError::PermissionDenied => CaptureError::PermissionDenied,
            other => CaptureError::Device {
                reason: other.to_string(),
            },
        }
    }
}

/// What the error-rendering slot currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSlot {
    /// Stable error code.
    pub code: &'static str,
    /// Display text.
    pub message: String,
    /// Whether a dismiss action is offered.
    pub dismissible: bool,
}

impl From<&CaptureError> for ErrorSlot {
    fn from(error: &CaptureError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
            dismissible: error.is_dismissible(),
        }
    }
}
