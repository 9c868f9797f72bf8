//! Live Document Capture Library
//!
//! The camera capture session controller of an identity-verification
//! SDK. A session owns a live video device from permission negotiation
//! through inactivity detection and frame capture to teardown, and hands
//! each capture to the host application exactly once.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! permission → session → watchdog (armed once ready)
//!                 ↓
//!          capture trigger → device frame grab → host callback
//! ```
//!
//! # Design Principles
//!
//! - **Explicit states**: one [`SessionState`] at a time, changed only by
//!   the pure [`session::transition`] function
//! - **Exactly once**: a capture result is built once and moved into the host
//! - **Terminal teardown**: nothing reaches the host after `teardown`
//! - **Injected collaborators**: device, clock and permission strategy are
//!   supplied by the caller
//!
//! # Example
//!
//! ```no_run
//! use doc_live_capture::{
//!     capture::{CaptureConfig, MockDevice},
//!     session::{CaptureError, CaptureHost, CaptureResult, CaptureSession},
//! };
//!
//! struct Host;
//!
//! impl CaptureHost for Host {
//!     fn on_capture(&mut self, result: CaptureResult) {
//!         println!("captured {}", result.filename());
//!     }
//!
//!     fn on_error(&mut self, error: &CaptureError) {
//!         eprintln!("capture failed: {}", error);
//!     }
//! }
//!
//! let config = CaptureConfig::for_document("passport");
//! let mut session = CaptureSession::new(config, MockDevice::new(), Host).unwrap();
//!
//! session.start();
//! session.request_capture();
//! session.teardown();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod metrics;
pub mod overlay;
pub mod permission;
pub mod session;
pub mod timing;

// Re-export commonly used types at crate root
pub use capture::{CaptureConfig, DeviceError, Frame, MediaDevice, MockDevice, SdkMetadata};
pub use overlay::{document_size, DocumentSizeClass};
pub use permission::{PermissionGate, PreGranted};
pub use session::{
    CaptureError, CaptureHost, CaptureResult, CaptureSession, RenderHints, SessionState,
};
pub use timing::{Clock, InactivityWatchdog, ManualClock, SystemClock};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
