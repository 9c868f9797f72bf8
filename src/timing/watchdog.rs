//! Single-shot inactivity timer.

use std::time::{Duration, Instant};

/// Lifecycle of an [`InactivityWatchdog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogState {
    /// Never armed.
    Idle,
    /// Counting down towards `deadline`.
    Armed {
        /// Instant at which the watchdog fires.
        deadline: Instant,
    },
    /// Deadline passed and the firing was reported.
    Fired,
    /// Stopped before the deadline.
    Cancelled,
}

/// Fires once if nothing disarms it within the configured window.
///
/// Arming is accepted only from [`WatchdogState::Idle`], so a watchdog
/// runs at most once over its lifetime. There is no reset on activity.
#[derive(Debug, Clone)]
pub struct InactivityWatchdog {
    window: Duration,
    state: WatchdogState,
}

impl InactivityWatchdog {
    /// Creates an idle watchdog with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: WatchdogState::Idle,
        }
    }

    /// Starts the countdown at `now`. Returns false if already used, or
    /// if the deadline is not representable (the watchdog stays idle).
    pub fn arm(&mut self, now: Instant) -> bool {
        if self.state != WatchdogState::Idle {
            tracing::debug!(state = ?self.state, "Watchdog re-arm ignored");
            return false;
        }
        let Some(deadline) = now.checked_add(self.window) else {
            tracing::warn!(
                window_secs = self.window.as_secs(),
                "Watchdog window out of range, not armed"
            );
            return false;
        };
        self.state = WatchdogState::Armed { deadline };
        tracing::debug!(window_ms = self.window.as_millis() as u64, "Watchdog armed");
        true
    }

    /// Checks the deadline. Returns true exactly once, on the first poll
    /// at or after the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            WatchdogState::Armed { deadline } if now >= deadline => {
                self.state = WatchdogState::Fired;
                tracing::info!("Inactivity watchdog fired");
                true
            }
            _ => false,
        }
    }

    /// Fires now if armed, whatever the deadline. Returns false if the
    /// watchdog was idle, cancelled or already fired.
    pub fn expire(&mut self) -> bool {
        if !self.is_armed() {
            tracing::debug!(state = ?self.state, "Late watchdog expiry ignored");
            return false;
        }
        self.state = WatchdogState::Fired;
        tracing::info!("Inactivity watchdog fired");
        true
    }

    /// Stops the countdown without firing. No-op unless armed.
    pub fn cancel(&mut self) {
        if self.is_armed() {
            self.state = WatchdogState::Cancelled;
            tracing::debug!("Watchdog cancelled");
        }
    }

    /// True while counting down.
    pub fn is_armed(&self) -> bool {
        matches!(self.state, WatchdogState::Armed { .. })
    }

    /// True once the deadline was reported.
    pub fn has_fired(&self) -> bool {
        self.state == WatchdogState::Fired
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WatchdogState {
        self.state
    }

    /// Time left before firing, if armed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match self.state {
            WatchdogState::Armed { deadline } => Some(deadline.saturating_duration_since(now)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(10);

    #[test]
    fn test_fires_once_after_window() {
        let start = Instant::now();
        let mut watchdog = InactivityWatchdog::new(WINDOW);
        assert!(watchdog.arm(start));

        assert!(!watchdog.poll(start + Duration::from_secs(9)));
        assert!(watchdog.poll(start + WINDOW));
        assert!(!watchdog.poll(start + Duration::from_secs(30)));
        assert!(watchdog.has_fired());
    }

    #[test]
    fn test_idle_never_fires() {
        let start = Instant::now();
        let mut watchdog = InactivityWatchdog::new(WINDOW);
        assert!(!watchdog.poll(start + Duration::from_secs(60)));
        assert_eq!(watchdog.state(), WatchdogState::Idle);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let start = Instant::now();
        let mut watchdog = InactivityWatchdog::new(WINDOW);
        watchdog.arm(start);
        watchdog.cancel();

        assert!(!watchdog.poll(start + WINDOW));
        assert_eq!(watchdog.state(), WatchdogState::Cancelled);
    }

    #[test]
    fn test_unrepresentable_window_stays_idle() {
        let mut watchdog = InactivityWatchdog::new(Duration::MAX);
        assert!(!watchdog.arm(Instant::now()));
        assert_eq!(watchdog.state(), WatchdogState::Idle);
        assert!(!watchdog.poll(Instant::now()));
    }

    #[test]
    fn test_expire_only_while_armed() {
        let start = Instant::now();
        let mut watchdog = InactivityWatchdog::new(WINDOW);
        assert!(!watchdog.expire());

        watchdog.arm(start);
        assert!(watchdog.expire());
        assert!(watchdog.has_fired());
        assert!(!watchdog.expire());
        assert!(!watchdog.poll(start + WINDOW));

        let mut cancelled = InactivityWatchdog::new(WINDOW);
        cancelled.arm(start);
        cancelled.cancel();
        assert!(!cancelled.expire());
        assert_eq!(cancelled.state(), WatchdogState::Cancelled);
    }

    #[test]
    fn test_armed_only_once() {
        let start = Instant::now();
        let mut watchdog = InactivityWatchdog::new(WINDOW);
        assert!(watchdog.arm(start));
        assert!(!watchdog.arm(start + Duration::from_secs(5)));
        assert_eq!(watchdog.remaining(start), Some(WINDOW));

        watchdog.cancel();
        assert!(!watchdog.arm(start + Duration::from_secs(6)));
        assert_eq!(watchdog.remaining(start), None);
    }
}
