//! Pre-granted strategy for verification runs.

use crate::capture::{CaptureConfig, MediaDevice, PermissionMode};
use crate::session::CaptureError;

use super::{PermissionSignal, PermissionStrategy};

/// Calls seen by the substituted handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookLog {
    /// Grants delivered.
    pub user_media_calls: u32,
    /// Failures relayed, in order.
    pub failures: Vec<CaptureError>,
}

type UserMediaHandler = Box<dyn FnMut()>;
type FailureHandler = Box<dyn FnMut(&CaptureError)>;

/// Grants access immediately without touching the device.
///
/// Grant and failure events go through substituted handlers, which can
/// be injected with [`PreGranted::with_handlers`]; every call is also
/// recorded in a [`HookLog`].
pub struct PreGranted {
    on_user_media: UserMediaHandler,
    on_failure: FailureHandler,
    log: HookLog,
}

impl PreGranted {
    /// Pre-granted strategy with no-op handlers.
    pub fn new() -> Self {
        Self::with_handlers(|| {}, |_| {})
    }

    /// Substitutes the grant and failure handlers.
    pub fn with_handlers(
        on_user_media: impl FnMut() + 'static,
        on_failure: impl FnMut(&CaptureError) + 'static,
    ) -> Self {
        Self {
            on_user_media: Box::new(on_user_media),
            on_failure: Box::new(on_failure),
            log: HookLog::default(),
        }
    }

    /// Calls seen so far.
    pub fn log(&self) -> &HookLog {
        &self.log
    }
}

impl Default for PreGranted {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionStrategy for PreGranted {
    fn mode(&self) -> PermissionMode {
        PermissionMode::PreGranted
    }

    fn negotiate(
        &mut self,
        _device: &mut dyn MediaDevice,
        _config: &CaptureConfig,
    ) -> PermissionSignal {
        self.log.user_media_calls += 1;
        (self.on_user_media)();
        tracing::info!("Camera access pre-granted");
        PermissionSignal::Granted
    }

    fn relay_failure(&mut self, error: CaptureError) -> CaptureError {
        (self.on_failure)(&error);
        self.log.failures.push(error.clone());
        error
    }

    fn hook_log(&self) -> Option<&HookLog> {
        Some(&self.log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MockDevice;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_grants_without_touching_device() {
        let mut strategy = PreGranted::new();
        let mut device = MockDevice::new();

        let signal = strategy.negotiate(&mut device, &CaptureConfig::default());

        assert_eq!(signal, PermissionSignal::Granted);
        assert_eq!(device.open_calls(), 0);
        assert!(!device.is_open());
        assert_eq!(strategy.log().user_media_calls, 1);
    }

    #[test]
    fn test_injected_handlers_observe_events() {
        let granted = Rc::new(Cell::new(0));
        let failed = Rc::new(Cell::new(0));
        let (g, f) = (Rc::clone(&granted), Rc::clone(&failed));
        let mut strategy =
            PreGranted::with_handlers(move || g.set(g.get() + 1), move |_| f.set(f.get() + 1));

        strategy.negotiate(&mut MockDevice::new(), &CaptureConfig::default());
        let relayed = strategy.relay_failure(CaptureError::PermissionDenied);

        assert_eq!(relayed, CaptureError::PermissionDenied);
        assert_eq!(granted.get(), 1);
        assert_eq!(failed.get(), 1);
        assert_eq!(
            strategy.hook_log().map(|log| log.failures.clone()),
            Some(vec![CaptureError::PermissionDenied])
        );
    }
}
