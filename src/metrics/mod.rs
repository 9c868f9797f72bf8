//! Prometheus metrics for capture sessions.
//!
//! # Metrics Exposed
//!
//! ## Session Metrics
//! - `doc_capture_session_state` - Current state code
//! - `doc_capture_button_enabled` - Capture button actionable (1/0)
//!
//! ## Outcome Metrics
//! - `doc_capture_captures_total` - Results delivered to the host
//! - `doc_capture_suppressed_triggers_total` - Triggers ignored outside `Ready`
//! - `doc_capture_inactivity_total` - Inactivity errors surfaced
//! - `doc_capture_device_errors_total` - Device errors surfaced
//! - `doc_capture_permission_denials_total` - Permission denials surfaced
//!
//! # Example
//!
//! ```no_run
//! use doc_live_capture::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     state_code: 2,
//!     capture_enabled: true,
//!     captures_delivered: 1,
//!     ..Default::default()
//! };
//!
//! registry.update(&snapshot);
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
