//! The capture session controller.
//!
//! Owns the device, the watchdog and the host callbacks, feeds every
//! inbound event through [`transition`] and runs the resulting effects.

use super::state::{transition, Effect, SessionEvent, SessionState};
use super::{CaptureError, CaptureResult, ErrorSlot};
use crate::capture::{CaptureConfig, ConfigError, Frame, FrameGrab, MediaDevice};
use crate::overlay::{document_size, DocumentSizeClass};
use crate::permission::{MediaHooks, PermissionGate};
use crate::timing::{Clock, InactivityWatchdog, SystemClock, WatchdogState};
use serde::Serialize;

/// Callbacks into the host application.
///
/// Both are invoked synchronously from inside the session's event
/// handlers and never after [`CaptureSession::teardown`].
pub trait CaptureHost {
    /// Receives each successful capture exactly once.
    fn on_capture(&mut self, result: CaptureResult);

    /// Receives each error episode once.
    fn on_error(&mut self, error: &CaptureError);
}

/// Read-only projection used to render the capture screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderHints {
    /// Name of the current state.
    pub state: &'static str,
    /// Show the spinner instead of the preview.
    pub spinner: bool,
    /// The capture button is actionable.
    pub capture_enabled: bool,
    /// Content of the error slot.
    pub error: Option<ErrorSlot>,
    /// Overlay outline for the configured document.
    pub document_size: DocumentSizeClass,
    /// The inactivity countdown is running.
    pub watchdog_armed: bool,
}

/// Counters accumulated over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Results handed to the host.
    pub captures_delivered: u64,
    /// Capture triggers ignored because the session was not ready.
    pub suppressed_triggers: u64,
    /// Inactivity errors surfaced.
    pub inactivity_episodes: u64,
    /// Device errors surfaced, permission denials excluded.
    pub device_errors: u64,
    /// Permission denials surfaced.
    pub permission_denials: u64,
}

/// One attempt to acquire a camera and obtain a capture.
pub struct CaptureSession<D: MediaDevice, H: CaptureHost> {
    config: CaptureConfig,
    device: D,
    host: H,
    gate: PermissionGate,
    watchdog: InactivityWatchdog,
    clock: Box<dyn Clock>,
    state: SessionState,
    torn_down: bool,
    stats: SessionStats,
}

impl<D: MediaDevice, H: CaptureHost> CaptureSession<D, H> {
    /// Creates a session in [`SessionState::Initializing`].
    ///
    /// The permission strategy follows `config.permission_mode` and time
    /// comes from the system clock; both can be replaced before `start`.
    pub fn new(config: CaptureConfig, device: D, host: H) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            gate: PermissionGate::for_mode(config.permission_mode),
            watchdog: InactivityWatchdog::new(config.watchdog_duration()),
            clock: Box::new(SystemClock),
            state: SessionState::Initializing,
            torn_down: false,
            stats: SessionStats::default(),
            config,
            device,
            host,
        })
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replaces the permission gate.
    pub fn with_permission_gate(mut self, gate: PermissionGate) -> Self {
        self.gate = gate;
        self
    }

    /// Asks the permission gate for camera access.
    ///
    /// Only meaningful once, from `Initializing`.
    pub fn start(&mut self) {
        if self.torn_down {
            return;
        }
        self.apply(SessionEvent::PermissionRequested);
    }

    /// Presses the capture button. Returns false if the trigger was
    /// ignored because the session is not `Ready`.
    pub fn request_capture(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        let accepted = self.apply(SessionEvent::CaptureRequested);
        if !accepted {
            self.stats.suppressed_triggers += 1;
            tracing::debug!(state = self.state.name(), "Capture trigger suppressed");
        }
        accepted
    }

    /// The stream became live. Idempotent.
    pub fn on_device_ready(&mut self) {
        if self.torn_down {
            return;
        }
        if !self.apply(SessionEvent::DeviceReady) {
            tracing::debug!(state = self.state.name(), "Repeated device ready ignored");
        }
    }

    /// The device layer reported a failure.
    pub fn on_device_error(&mut self, error: impl Into<CaptureError>) {
        if self.torn_down {
            return;
        }
        let error = self.gate.relay_failure(error.into());
        self.on_failure(error);
    }

    /// A frame requested earlier arrived.
    pub fn on_frame(&mut self, frame: Frame) {
        if self.torn_down {
            tracing::debug!(?frame, "Frame arrived after teardown, dropped");
            return;
        }
        if !self.apply(SessionEvent::FrameGrabbed(frame)) {
            tracing::debug!(state = self.state.name(), "Unexpected frame dropped");
        }
    }

    /// An external timer reports the inactivity window elapsed.
    ///
    /// Honoured only while the watchdog is armed, so a late event after a
    /// capture, a device error or an earlier firing changes nothing.
    pub fn on_watchdog_fired(&mut self) {
        if self.torn_down {
            return;
        }
        if self.watchdog.expire() {
            self.report_inactivity();
        }
    }

    /// Polls the watchdog against the session clock. Returns true when it
    /// fired during this call.
    pub fn tick(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        let fired = self.watchdog.poll(self.clock.now());
        if fired {
            self.report_inactivity();
        }
        fired
    }

    /// Clears a dismissible error and returns to `Ready`.
    pub fn dismiss_error(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.apply(SessionEvent::ErrorDismissed)
    }

    /// Ends the session. No host callback fires afterwards.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.watchdog.cancel();

        if self.state.is_busy() {
            self.device.cancel_pending();
            self.state = SessionState::Ready;
        }
        self.device.close();
        tracing::info!(state = self.state.name(), "Capture session torn down");
    }

    /// Tears down and hands the device over to the next session.
    pub fn into_device(mut self) -> D {
        self.teardown();
        self.device
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// True once `teardown` ran.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Counters so far.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Validated configuration.
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// The host, for inspection.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The device, for inspection.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The active permission gate.
    pub fn permission_gate(&self) -> &PermissionGate {
        &self.gate
    }

    /// Lifecycle of the inactivity watchdog.
    pub fn watchdog_state(&self) -> WatchdogState {
        self.watchdog.state()
    }

    /// Projection for the view layer.
    pub fn render_hints(&self) -> RenderHints {
        RenderHints {
            state: self.state.name(),
            spinner: self.state.is_busy(),
            capture_enabled: !self.torn_down && self.state.accepts_capture(),
            error: self.state.error().map(ErrorSlot::from),
            document_size: document_size(self.config.document_type.as_deref()),
            watchdog_armed: self.watchdog.is_armed(),
        }
    }

    fn report_inactivity(&mut self) {
        self.apply(SessionEvent::WatchdogFired {
            fallback_available: !self.config.upload_fallback_disabled,
        });
    }

    /// Feeds one event through the state machine and runs its effects.
    fn apply(&mut self, event: SessionEvent) -> bool {
        let outcome = transition(&self.state, event);
        if !outcome.accepted {
            return false;
        }

        if outcome.next != self.state {
            tracing::info!(
                from = self.state.name(),
                to = outcome.next.name(),
                "Session state changed"
            );
        }
        self.state = outcome.next;

        for effect in outcome.effects {
            self.run(effect);
        }
        true
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::NegotiatePermission => {
                let signal = self.gate.negotiate(&mut self.device, &self.config);
                signal.dispatch(self);
            }
            Effect::ArmWatchdog => {
                self.watchdog.arm(self.clock.now());
            }
            Effect::CancelWatchdog => self.watchdog.cancel(),
            Effect::RequestFrame => {
                tracing::info!(mime_type = %self.config.mime_type, "Taking live photo of document");
                match self.device.request_frame(&self.config.mime_type) {
                    Ok(FrameGrab::Ready(frame)) => self.on_frame(frame),
                    Ok(FrameGrab::Pending) => {
                        tracing::debug!("Waiting for frame");
                    }
                    Err(e) => self.on_device_error(e),
                }
            }
            Effect::CancelPendingFrame => self.device.cancel_pending(),
            Effect::DeliverCapture(result) => {
                if self.torn_down {
                    return;
                }
                self.stats.captures_delivered += 1;
                tracing::info!(
                    filename = result.filename(),
                    bytes = result.image_bytes().len(),
                    fingerprint = %result.fingerprint(),
                    "Document captured"
                );
                self.host.on_capture(result);
            }
            Effect::ReportError(error) => {
                if self.torn_down {
                    return;
                }
                match error {
                    CaptureError::Inactivity { .. } => self.stats.inactivity_episodes += 1,
                    CaptureError::PermissionDenied => self.stats.permission_denials += 1,
                    CaptureError::Device { .. } => self.stats.device_errors += 1,
                }
                tracing::warn!(code = error.code(), error = %error, "Capture error surfaced");
                self.host.on_error(&error);
            }
        }
    }
}

impl<D: MediaDevice, H: CaptureHost> MediaHooks for CaptureSession<D, H> {
    fn on_user_media(&mut self) {
        self.on_device_ready();
    }

    fn on_failure(&mut self, error: CaptureError) {
        if self.torn_down {
            return;
        }
        self.apply(SessionEvent::DeviceFailed(error));
    }
}

impl<D: MediaDevice, H: CaptureHost> std::fmt::Debug for CaptureSession<D, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state)
            .field("torn_down", &self.torn_down)
            .field("gate", &self.gate)
            .field("watchdog", &self.watchdog.state())
            .field("stats", &self.stats)
            .finish()
    }
}
