//! Session states and the pure transition function.
//!
//! [`transition`] decides the next state and the side effects to run;
//! it never touches the device, the clock or the host. The controller
//! in `controller.rs` executes the returned [`Effect`]s.

use super::{CaptureError, CaptureResult};
use crate::capture::Frame;

/// Where a capture session currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Created, permission not yet requested.
    Initializing,
    /// Waiting for the permission gate to answer.
    AwaitingPermission,
    /// Stream live; the capture button is enabled.
    Ready,
    /// A frame grab is outstanding; further triggers are ignored.
    Capturing,
    /// The watchdog fired before any capture.
    Inactive(CaptureError),
    /// The device failed or permission was denied.
    DeviceError(CaptureError),
}

impl SessionState {
    /// Stable lowercase name used in logs and render hints.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Initializing => "initializing",
            SessionState::AwaitingPermission => "awaiting_permission",
            SessionState::Ready => "ready",
            SessionState::Capturing => "capturing",
            SessionState::Inactive(_) => "inactive",
            SessionState::DeviceError(_) => "device_error",
        }
    }

    /// Numeric code exported as a metrics gauge.
    pub fn code(&self) -> i64 {
        match self {
            SessionState::Initializing => 0,
            SessionState::AwaitingPermission => 1,
            SessionState::Ready => 2,
            SessionState::Capturing => 3,
            SessionState::Inactive(_) => 4,
            SessionState::DeviceError(_) => 5,
        }
    }

    /// The error shown in the error slot, if any.
    pub fn error(&self) -> Option<&CaptureError> {
        match self {
            SessionState::Inactive(e) | SessionState::DeviceError(e) => Some(e),
            _ => None,
        }
    }

    /// True while a grab is outstanding (the spinner is shown).
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Capturing)
    }

    /// The capture affordance is actionable only when ready.
    pub fn accepts_capture(&self) -> bool {
        matches!(self, SessionState::Ready)
    }
}

/// Discrete inputs to the state machine.
#[derive(Debug)]
pub enum SessionEvent {
    /// The session asked the permission gate for access.
    PermissionRequested,
    /// The stream is live.
    DeviceReady,
    /// The device failed or access was refused.
    DeviceFailed(CaptureError),
    /// The user pressed the capture button.
    CaptureRequested,
    /// The requested frame arrived.
    FrameGrabbed(Frame),
    /// The inactivity watchdog expired.
    WatchdogFired {
        /// Whether the user can still upload a photo instead.
        fallback_available: bool,
    },
    /// The user dismissed the error slot.
    ErrorDismissed,
}

/// Side effects requested by a transition, run in order.
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    /// Ask the permission gate for access.
    NegotiatePermission,
    /// Start the inactivity countdown.
    ArmWatchdog,
    /// Stop the inactivity countdown.
    CancelWatchdog,
    /// Ask the device for one frame.
    RequestFrame,
    /// Abandon an outstanding deferred grab.
    CancelPendingFrame,
    /// Hand a result to the host.
    DeliverCapture(CaptureResult),
    /// Surface an error to the host.
    ReportError(CaptureError),
}

/// Result of feeding one event to [`transition`].
#[derive(Debug)]
pub struct Transition {
    /// State after the event.
    pub next: SessionState,
    /// Effects to run, in order.
    pub effects: Vec<Effect>,
    /// False when the event was ignored in the current state.
    pub accepted: bool,
}

impl Transition {
    fn to(next: SessionState, effects: Vec<Effect>) -> Self {
        Self {
            next,
            effects,
            accepted: true,
        }
    }

    fn ignored(state: &SessionState) -> Self {
        Self {
            next: state.clone(),
            effects: Vec::new(),
            accepted: false,
        }
    }
}

/// Computes the next state and effects for `event` in `state`.
pub fn transition(state: &SessionState, event: SessionEvent) -> Transition {
    use SessionEvent as E;
    use SessionState as S;

    match (state, event) {
        (S::Initializing, E::PermissionRequested) => {
            Transition::to(S::AwaitingPermission, vec![Effect::NegotiatePermission])
        }

        (S::Initializing | S::AwaitingPermission, E::DeviceReady) => {
            Transition::to(S::Ready, vec![Effect::ArmWatchdog])
        }

        (S::Ready, E::CaptureRequested) => Transition::to(
            S::Capturing,
            vec![Effect::CancelWatchdog, Effect::RequestFrame],
        ),

        (S::Capturing, E::FrameGrabbed(frame)) => Transition::to(
            S::Ready,
            vec![Effect::DeliverCapture(CaptureResult::from_frame(frame))],
        ),

        (S::Ready, E::WatchdogFired { fallback_available }) => {
            let error = CaptureError::Inactivity { fallback_available };
            Transition::to(S::Inactive(error.clone()), vec![Effect::ReportError(error)])
        }

        (S::Inactive(_), E::ErrorDismissed) => Transition::to(S::Ready, Vec::new()),

        (S::DeviceError(_), E::DeviceFailed(_)) => Transition::ignored(state),

        (S::Ready, E::DeviceFailed(error)) => Transition::to(
            S::DeviceError(error.clone()),
            vec![Effect::CancelWatchdog, Effect::ReportError(error)],
        ),

        (S::Capturing, E::DeviceFailed(error)) => Transition::to(
            S::DeviceError(error.clone()),
            vec![Effect::CancelPendingFrame, Effect::ReportError(error)],
        ),

        (_, E::DeviceFailed(error)) => Transition::to(
            S::DeviceError(error.clone()),
            vec![Effect::ReportError(error)],
        ),

        _ => Transition::ignored(state),
    }
}
