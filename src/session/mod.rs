//! Capture session state machine.
//!
//! A session walks a single device from permission negotiation to one
//! or more captures, surfacing inactivity and device failures through a
//! single error slot. The pure [`transition`] function holds the rules;
//! [`CaptureSession`] applies them to a real device and host.
//!
//! ```text
//! Initializing → AwaitingPermission → Ready ⇄ Capturing
//!                                       │  ↘
//!                                  Inactive  DeviceError
//! ```

mod controller;
mod error;
mod result;
mod state;

pub use controller::{CaptureHost, CaptureSession, RenderHints, SessionStats};
pub use error::{CaptureError, ErrorSlot};
pub use result::CaptureResult;
pub use state::{transition, Effect, SessionEvent, SessionState, Transition};
