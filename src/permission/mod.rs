//! Camera permission negotiation.
//!
//! The [`PermissionGate`] sits between the device and anything exposing
//! [`MediaHooks`]. Its strategy decides whether grant and deny come from
//! real device negotiation ([`DeviceNegotiation`]) or are synthesized for
//! verification runs ([`PreGranted`]).

mod gate;
mod stub;

pub use gate::{DeviceNegotiation, MediaHooks, PermissionGate, PermissionSignal, PermissionStrategy};
pub use stub::{HookLog, PreGranted};
