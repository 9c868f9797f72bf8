//! Permission gate and the real negotiation strategy.

use crate::capture::{CaptureConfig, MediaDevice, PermissionMode};
use crate::session::CaptureError;

use super::{HookLog, PreGranted};

/// Hooks a camera consumer exposes to the device layer.
pub trait MediaHooks {
    /// The stream is live and permission was granted.
    fn on_user_media(&mut self);

    /// Access was refused or the device failed.
    fn on_failure(&mut self, error: CaptureError);
}

/// Answer produced by a permission strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionSignal {
    /// The stream is live.
    Granted,
    /// Access was refused or the device failed to open.
    Denied(CaptureError),
}

impl PermissionSignal {
    /// Delivers the signal to the matching hook.
    pub fn dispatch<H: MediaHooks + ?Sized>(self, hooks: &mut H) {
        match self {
            PermissionSignal::Granted => hooks.on_user_media(),
            PermissionSignal::Denied(error) => hooks.on_failure(error),
        }
    }
}

/// How grant and deny are obtained.
pub trait PermissionStrategy {
    /// The configuration value this strategy implements.
    fn mode(&self) -> PermissionMode;

    /// Obtains access to `device`.
    fn negotiate(&mut self, device: &mut dyn MediaDevice, config: &CaptureConfig)
        -> PermissionSignal;

    /// Passes a failure observed after negotiation back through the
    /// strategy's failure handler.
    fn relay_failure(&mut self, error: CaptureError) -> CaptureError {
        error
    }

    /// Calls recorded by substituted handlers, if this strategy has any.
    fn hook_log(&self) -> Option<&HookLog> {
        None
    }
}

/// Pass-through strategy: opens the device and forwards its answer.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeviceNegotiation;

impl PermissionStrategy for DeviceNegotiation {
    fn mode(&self) -> PermissionMode {
        PermissionMode::Negotiate
    }

    fn negotiate(
        &mut self,
        device: &mut dyn MediaDevice,
        config: &CaptureConfig,
    ) -> PermissionSignal {
        if device.is_open() {
            return PermissionSignal::Granted;
        }

        match device.open(config) {
            Ok(height) => {
                tracing::info!(height, "Camera access granted");
                PermissionSignal::Granted
            }
            Err(e) => {
                tracing::warn!(error = %e, "Camera access failed");
                PermissionSignal::Denied(e.into())
            }
        }
    }
}

/// Decorates a camera consumer with a permission strategy.
pub struct PermissionGate {
    strategy: Box<dyn PermissionStrategy>,
}

impl PermissionGate {
    /// Wraps a strategy.
    pub fn new(strategy: impl PermissionStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    /// Builds the gate matching a configured mode.
    pub fn for_mode(mode: PermissionMode) -> Self {
        match mode {
            PermissionMode::Negotiate => Self::new(DeviceNegotiation),
            PermissionMode::PreGranted => Self::new(PreGranted::new()),
        }
    }

    /// Mode of the wrapped strategy.
    pub fn mode(&self) -> PermissionMode {
        self.strategy.mode()
    }

    /// Runs the strategy and returns its answer.
    pub fn negotiate(
        &mut self,
        device: &mut dyn MediaDevice,
        config: &CaptureConfig,
    ) -> PermissionSignal {
        tracing::debug!(mode = ?self.mode(), "Requesting camera access");
        self.strategy.negotiate(device, config)
    }

    /// Runs the strategy and delivers its answer to `hooks`.
    pub fn attach<H: MediaHooks + ?Sized>(
        &mut self,
        device: &mut dyn MediaDevice,
        config: &CaptureConfig,
        hooks: &mut H,
    ) {
        self.negotiate(device, config).dispatch(hooks);
    }

    /// Passes a device failure through the strategy's failure handler.
    pub fn relay_failure(&mut self, error: CaptureError) -> CaptureError {
        self.strategy.relay_failure(error)
    }

    /// Recorded hook calls, for strategies that keep them.
    pub fn hook_log(&self) -> Option<&HookLog> {
        self.strategy.hook_log()
    }
}

impl std::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGate")
            .field("mode", &self.mode())
            .finish()
    }
}
