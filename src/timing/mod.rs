//! Time sources and the inactivity watchdog.
//!
//! The session never reads the wall clock directly: time comes from an
//! injected [`Clock`], so inactivity can be driven deterministically.

mod clock;
mod watchdog;

pub use clock::{Clock, ManualClock, SystemClock};
pub use watchdog::{InactivityWatchdog, WatchdogState};
