//! Metrics collection and registry.

use crate::capture::MediaDevice;
use crate::session::{CaptureHost, CaptureSession};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of session state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Numeric code of the current session state.
    pub state_code: i64,
    /// Whether the capture button is actionable.
    pub capture_enabled: bool,
    /// Results handed to the host.
    pub captures_delivered: u64,
    /// Triggers ignored outside `Ready`.
    pub suppressed_triggers: u64,
    /// Inactivity errors surfaced.
    pub inactivity_episodes: u64,
    /// Device errors surfaced.
    pub device_errors: u64,
    /// Permission denials surfaced.
    pub permission_denials: u64,
}

impl MetricsSnapshot {
    /// Creates a snapshot from a session.
    pub fn from_session<D: MediaDevice, H: CaptureHost>(session: &CaptureSession<D, H>) -> Self {
        let stats = session.stats();
        Self {
            state_code: session.state().code(),
            capture_enabled: session.render_hints().capture_enabled,
            captures_delivered: stats.captures_delivered,
            suppressed_triggers: stats.suppressed_triggers,
            inactivity_episodes: stats.inactivity_episodes,
            device_errors: stats.device_errors,
            permission_denials: stats.permission_denials,
        }
    }
}

/// Prometheus metrics registry for capture sessions.
pub struct MetricsRegistry {
    registry: Registry,

    // Session state
    session_state: IntGauge,
    capture_enabled: IntGauge,

    // Outcomes
    captures_total: IntCounter,
    suppressed_triggers_total: IntCounter,
    inactivity_total: IntCounter,
    device_errors_total: IntCounter,
    permission_denials_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new registry with all session metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let session_state = IntGauge::new(
            "doc_capture_session_state",
            "Current session state (0=initializing, 1=awaiting_permission, 2=ready, 3=capturing, 4=inactive, 5=device_error)",
        )?;
        let capture_enabled = IntGauge::new(
            "doc_capture_button_enabled",
            "Whether the capture button is actionable (1=enabled, 0=disabled)",
        )?;

        let captures_total = IntCounter::new(
            "doc_capture_captures_total",
            "Capture results delivered to the host",
        )?;
        let suppressed_triggers_total = IntCounter::new(
            "doc_capture_suppressed_triggers_total",
            "Capture triggers ignored because the session was not ready",
        )?;
        let inactivity_total = IntCounter::new(
            "doc_capture_inactivity_total",
            "Inactivity errors surfaced",
        )?;
        let device_errors_total = IntCounter::new(
            "doc_capture_device_errors_total",
            "Device errors surfaced",
        )?;
        let permission_denials_total = IntCounter::new(
            "doc_capture_permission_denials_total",
            "Camera permission denials surfaced",
        )?;

        registry.register(Box::new(session_state.clone()))?;
        registry.register(Box::new(capture_enabled.clone()))?;
        registry.register(Box::new(captures_total.clone()))?;
        registry.register(Box::new(suppressed_triggers_total.clone()))?;
        registry.register(Box::new(inactivity_total.clone()))?;
        registry.register(Box::new(device_errors_total.clone()))?;
        registry.register(Box::new(permission_denials_total.clone()))?;

        Ok(Self {
            registry,
            session_state,
            capture_enabled,
            captures_total,
            suppressed_triggers_total,
            inactivity_total,
            device_errors_total,
            permission_denials_total,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.session_state.set(snapshot.state_code);
        self.capture_enabled
            .set(if snapshot.capture_enabled { 1 } else { 0 });

        // Counters only move forward; add the difference.
        advance(&self.captures_total, snapshot.captures_delivered);
        advance(&self.suppressed_triggers_total, snapshot.suppressed_triggers);
        advance(&self.inactivity_total, snapshot.inactivity_episodes);
        advance(&self.device_errors_total, snapshot.device_errors);
        advance(&self.permission_denials_total, snapshot.permission_denials);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}
